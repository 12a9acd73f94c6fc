//! Monitors bound to a type rather than to an instance.
//!
//! Each Rust type gets a single process-wide monitor, created the first time it is asked for and
//! kept until the process exits. Use it when a critical section spans every instance of a type.

use crate::monitor::Monitor;
use lazy_static::lazy_static;
use log::debug;
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;

lazy_static! {
    static ref CLASS_MONITORS: RwLock<HashMap<TypeId, &'static Monitor>> =
        RwLock::new(HashMap::new());
}

/// Returns the monitor shared by everything that synchronizes on type `T`.
///
/// Lookups of existing monitors only take the registry's read lock. The write lock is taken once
/// per type, on first use.
pub fn class_monitor<T: ?Sized + 'static>() -> &'static Monitor {
    let id = TypeId::of::<T>();
    let existing = CLASS_MONITORS.read().get(&id).copied();
    if let Some(monitor) = existing {
        return monitor;
    }

    // Another thread may have created it between the two locks.
    let mut monitors = CLASS_MONITORS.write();
    *monitors.entry(id).or_insert_with(|| {
        debug!("creating class monitor for {}", type_name::<T>());
        let monitor: &'static Monitor = Box::leak(Box::new(Monitor::new()));
        monitor
    })
}

/// Runs `f` inside the class monitor of `T`.
pub fn synchronized_class<T: ?Sized + 'static, R, F: FnOnce() -> R>(f: F) -> R {
    class_monitor::<T>().synchronized(f)
}
