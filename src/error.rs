use std::fmt;
use std::thread::ThreadId;

/// The monitor operation that was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Acquire,
    Release,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Acquire => f.write_str("acquire"),
            Action::Release => f.write_str("release"),
        }
    }
}

/// Returned when a thread uses a monitor it has no right to.
///
/// Either it released a monitor it does not hold, or it passed another thread's id to `acquire`
/// or `release`. Both are programming errors: every `release` must be paired with an earlier
/// `acquire` made by the same thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IllegalStateError {
    action: Action,
    thread: ThreadId,
    holder: Option<ThreadId>,
    foreign: bool,
}

impl IllegalStateError {
    pub(crate) fn not_holder(thread: ThreadId, holder: Option<ThreadId>) -> Self {
        IllegalStateError {
            action: Action::Release,
            thread,
            holder,
            foreign: false,
        }
    }

    pub(crate) fn impersonation(action: Action, thread: ThreadId, holder: Option<ThreadId>) -> Self {
        IllegalStateError {
            action,
            thread,
            holder,
            foreign: true,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// The thread id passed to the refused call.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// The thread actually holding the monitor at the time, if any.
    pub fn holder(&self) -> Option<ThreadId> {
        self.holder
    }

    /// `true` if the call was made from a thread other than `thread()`.
    pub fn is_foreign(&self) -> bool {
        self.foreign
    }
}

impl fmt::Display for IllegalStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.foreign {
            return write!(
                f,
                "cannot {} a monitor on behalf of thread {:?} from another thread",
                self.action, self.thread
            );
        }

        match self.holder {
            Some(holder) => write!(
                f,
                "thread {:?} released a monitor held by thread {:?}",
                self.thread, holder
            ),
            None => write!(f, "thread {:?} released a monitor that is not held", self.thread),
        }
    }
}

impl std::error::Error for IllegalStateError {}
