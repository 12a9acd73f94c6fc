use crate::config::{Config, DefaultConfig};
use crate::error::{Action, IllegalStateError};
use crate::state::MonitorState;
use log::{debug, error, trace};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::marker::PhantomData;
use std::thread::{current, ThreadId};

struct LockWord {
    holder: Option<ThreadId>,
    hold_count: usize,
    waiters: usize,
}

impl LockWord {
    /// Claims the word for `thread` if it is free or already held by that thread.
    fn try_claim(&mut self, thread: ThreadId) -> bool {
        match self.holder {
            None => {
                self.holder = Some(thread);
                self.hold_count = 1;
                true
            }
            Some(holder) if holder == thread => {
                self.hold_count += 1;
                true
            }
            Some(_) => false,
        }
    }
}

/// A reentrant mutual-exclusion lock bound to an object identity.
///
/// Only one thread can be inside a monitor at a time, but that thread may enter again without
/// blocking. Each `acquire` must be matched by a `release` from the same thread before anyone else
/// gets in. Everything a thread writes while holding the monitor is visible to the next thread
/// that acquires it.
///
/// Waiting threads are parked, not spun, once the spin budget of `C` runs out. Wake-up is unfair:
/// a thread arriving at the right moment may take the monitor ahead of a parked one, but each
/// release that frees the monitor while threads are parked wakes one of them.
pub struct Monitor<C: Config = DefaultConfig> {
    word: Mutex<LockWord>,
    condvar: Condvar,
    _config: PhantomData<fn() -> C>,
}

impl<C: Config> Monitor<C> {
    pub const fn new() -> Self {
        Monitor {
            word: Mutex::new(LockWord {
                holder: None,
                hold_count: 0,
                waiters: 0,
            }),
            condvar: Condvar::new(),
            _config: PhantomData,
        }
    }

    /// Blocks until `thread` holds the monitor.
    ///
    /// Returns immediately, bumping the hold count, if `thread` already holds it. `thread` must be
    /// the calling thread; a thread cannot take the monitor on another thread's behalf.
    pub fn acquire(&self, thread: ThreadId) -> Result<(), IllegalStateError> {
        self.check_caller(thread, Action::Acquire)?;
        self.claim(thread);
        Ok(())
    }

    /// Acquires the monitor for `thread` if that can be done without blocking.
    pub fn try_acquire(&self, thread: ThreadId) -> Result<bool, IllegalStateError> {
        self.check_caller(thread, Action::Acquire)?;
        Ok(self.word.lock().try_claim(thread))
    }

    /// Undoes one `acquire` made by `thread`.
    ///
    /// When the last hold is released the monitor becomes free and one parked thread, if any, is
    /// woken. Fails without touching the monitor if `thread` is not the calling thread or is not
    /// the holder.
    pub fn release(&self, thread: ThreadId) -> Result<(), IllegalStateError> {
        self.check_caller(thread, Action::Release)?;
        self.unclaim(thread)
    }

    /// Enters the monitor on the current thread. The returned guard releases it when dropped.
    pub fn enter(&self) -> MonitorGuard<'_, C> {
        let thread = current().id();
        self.claim(thread);
        MonitorGuard::new(self, thread)
    }

    pub fn try_enter(&self) -> Option<MonitorGuard<'_, C>> {
        let thread = current().id();
        if self.word.lock().try_claim(thread) {
            Some(MonitorGuard::new(self, thread))
        } else {
            None
        }
    }

    /// Runs `f` as a critical section guarded by this monitor.
    pub fn synchronized<R, F: FnOnce() -> R>(&self, f: F) -> R {
        let _guard = self.enter();
        f()
    }

    pub fn is_locked(&self) -> bool {
        self.word.lock().holder.is_some()
    }

    pub fn is_held_by(&self, thread: ThreadId) -> bool {
        self.word.lock().holder == Some(thread)
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.is_held_by(current().id())
    }

    /// Number of unreleased acquisitions made by the current holder. Zero when free.
    pub fn hold_count(&self) -> usize {
        self.word.lock().hold_count
    }

    pub fn state(&self) -> MonitorState {
        let word = self.word.lock();
        MonitorState::from_counts(word.holder.is_some(), word.hold_count, word.waiters)
    }

    fn check_caller(&self, thread: ThreadId, action: Action) -> Result<(), IllegalStateError> {
        if thread == current().id() {
            return Ok(());
        }

        let holder = self.word.lock().holder;
        debug!("{:?} tried to {} as {:?}", current().id(), action, thread);
        Err(IllegalStateError::impersonation(action, thread, holder))
    }

    /// Blocking acquire for a thread already known to be the caller.
    fn claim(&self, thread: ThreadId) {
        for attempt in 0..C::spin_count() {
            if self.word.lock().try_claim(thread) {
                return;
            }
            C::backoff(attempt);
        }

        let mut word = self.word.lock();
        while !word.try_claim(thread) {
            trace!("{:?} parking on monitor held by {:?}", thread, word.holder);
            word.waiters += 1;
            self.condvar.wait(&mut word);
            word.waiters -= 1;
        }
    }

    fn unclaim(&self, thread: ThreadId) -> Result<(), IllegalStateError> {
        let mut word = self.word.lock();

        if word.holder != Some(thread) {
            debug!("{:?} tried to release a monitor held by {:?}", thread, word.holder);
            return Err(IllegalStateError::not_holder(thread, word.holder));
        }

        word.hold_count -= 1;
        if word.hold_count == 0 {
            word.holder = None;

            if word.waiters > 0 {
                trace!("{:?} released monitor, waking 1 of {} waiters", thread, word.waiters);
                self.condvar.notify_one();
            }
        }

        Ok(())
    }
}

impl<C: Config> Default for Monitor<C> {
    fn default() -> Self {
        Monitor::new()
    }
}

impl<C: Config> fmt::Debug for Monitor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.word.try_lock() {
            Some(word) => f
                .debug_struct("Monitor")
                .field("holder", &word.holder)
                .field(
                    "state",
                    &MonitorState::from_counts(word.holder.is_some(), word.hold_count, word.waiters),
                )
                .finish(),
            None => f.debug_struct("Monitor").finish_non_exhaustive(),
        }
    }
}

/// Releases one hold on a [`Monitor`] when dropped.
///
/// The guard is tied to the thread that acquired it and cannot be sent elsewhere.
#[must_use = "the monitor is released as soon as the guard is dropped"]
pub struct MonitorGuard<'a, C: Config = DefaultConfig> {
    monitor: &'a Monitor<C>,
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl<'a, C: Config> MonitorGuard<'a, C> {
    fn new(monitor: &'a Monitor<C>, thread: ThreadId) -> Self {
        MonitorGuard {
            monitor,
            thread,
            _not_send: PhantomData,
        }
    }

    pub fn monitor(&self) -> &'a Monitor<C> {
        self.monitor
    }
}

impl<C: Config> Drop for MonitorGuard<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.monitor.unclaim(self.thread) {
            error!("monitor guard dropped after its hold was released: {}", err);
        }
    }
}
