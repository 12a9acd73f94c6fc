//! Reentrant object monitors.
//!
//! A [`Monitor`] is a mutual-exclusion lock that the holding thread may re-enter. It is also a
//! visibility barrier: writes made inside the critical section are seen by the next thread to enter
//! it. Monitors can be bound to a value with [`Synchronized`] or to a type with [`class_monitor`].

pub mod class;
pub mod config;
pub mod error;
pub mod monitor;
pub mod object;
pub mod state;

pub use class::{class_monitor, synchronized_class};
pub use config::{Config, DefaultConfig};
pub use error::{Action, IllegalStateError};
pub use monitor::{Monitor, MonitorGuard};
pub use object::{Synchronized, SynchronizedGuard};
pub use state::MonitorState;
