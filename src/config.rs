//! Spin tuning for [`Monitor::acquire`](crate::Monitor::acquire).

use std::fmt;
use std::hint::spin_loop;
use std::thread::yield_now;

/// Controls how long a contended `acquire` spins before parking the thread.
pub trait Config: fmt::Debug + Default {
    /// Number of non-blocking attempts made before the thread is parked.
    #[inline]
    fn spin_count() -> usize {
        64
    }

    /// Called between two failed attempts.
    #[inline]
    fn backoff(attempt: usize) {
        if attempt % 16 == 15 {
            yield_now();
        } else {
            spin_loop();
        }
    }
}

/// Default configuration for monitors.
#[derive(Debug, Default)]
pub struct DefaultConfig;

impl Config for DefaultConfig {}

/// Parks immediately on contention.
#[derive(Debug, Default)]
pub struct NoSpin;

impl Config for NoSpin {
    #[inline]
    fn spin_count() -> usize {
        0
    }
}
