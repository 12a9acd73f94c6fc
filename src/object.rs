//! Values that carry their own monitor.

use crate::config::{Config, DefaultConfig};
use crate::monitor::{Monitor, MonitorGuard};
use crate::state::MonitorState;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::ops::Deref;

/// A value bundled with the monitor that guards it.
///
/// The monitor lives and dies with the value. The value can only be reached while the current
/// thread holds the monitor, so every access path goes through the same lock.
///
/// Because the monitor is reentrant, a thread can lock the same object again while it is already
/// inside. Nested guards share one `RefCell`, so two overlapping mutable borrows still panic.
pub struct Synchronized<T, C: Config = DefaultConfig> {
    // Never handed out: a raw `release` on it would let a second thread into the `RefCell` while
    // a guard is still alive.
    monitor: Monitor<C>,
    value: RefCell<T>,
}

// The `RefCell` is only touched by the thread holding `monitor`.
unsafe impl<T: Send, C: Config> Sync for Synchronized<T, C> {}

impl<T, C: Config> Synchronized<T, C> {
    pub fn new(value: T) -> Self {
        Synchronized {
            monitor: Monitor::new(),
            value: RefCell::new(value),
        }
    }

    /// Enters this object's monitor on the current thread.
    pub fn lock(&self) -> SynchronizedGuard<'_, T, C> {
        SynchronizedGuard {
            _guard: self.monitor.enter(),
            value: &self.value,
        }
    }

    pub fn try_lock(&self) -> Option<SynchronizedGuard<'_, T, C>> {
        self.monitor.try_enter().map(|guard| SynchronizedGuard {
            _guard: guard,
            value: &self.value,
        })
    }

    /// Runs `f` on the value inside this object's monitor.
    ///
    /// # Panics
    /// Panics if called from within another `with` on the same object, as the value is already
    /// mutably borrowed.
    pub fn with<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let guard = self.lock();
        let mut value = guard.borrow_mut();
        f(&mut *value)
    }

    /// Runs `f` inside this object's monitor without touching the value, for guarding wider
    /// sections on the same identity.
    pub fn synchronized<R, F: FnOnce() -> R>(&self, f: F) -> R {
        self.monitor.synchronized(f)
    }

    pub fn is_locked(&self) -> bool {
        self.monitor.is_locked()
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.monitor.is_held_by_current_thread()
    }

    pub fn hold_count(&self) -> usize {
        self.monitor.hold_count()
    }

    pub fn state(&self) -> MonitorState {
        self.monitor.state()
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default, C: Config> Default for Synchronized<T, C> {
    fn default() -> Self {
        Synchronized::new(T::default())
    }
}

impl<T, C: Config> From<T> for Synchronized<T, C> {
    fn from(value: T) -> Self {
        Synchronized::new(value)
    }
}

impl<T: fmt::Debug, C: Config> fmt::Debug for Synchronized<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Synchronized");
        match self.try_lock() {
            Some(guard) => {
                let value = guard.try_borrow();
                match value {
                    Ok(value) => debug.field("value", &*value),
                    Err(_) => debug.field("value", &"<borrowed>"),
                };
            }
            None => {
                debug.field("value", &"<locked>");
            }
        }
        debug.finish()
    }
}

/// Access to a [`Synchronized`] value while its monitor is held.
#[must_use = "the monitor is released as soon as the guard is dropped"]
pub struct SynchronizedGuard<'a, T, C: Config = DefaultConfig> {
    _guard: MonitorGuard<'a, C>,
    value: &'a RefCell<T>,
}

impl<'a, T, C: Config> SynchronizedGuard<'a, T, C> {
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.value.borrow_mut()
    }
}

impl<T, C: Config> Deref for SynchronizedGuard<'_, T, C> {
    type Target = RefCell<T>;

    fn deref(&self) -> &RefCell<T> {
        self.value
    }
}
