use bitflags::bitflags;

bitflags! {
    /// Snapshot of a monitor's lock word.
    pub struct MonitorState: u8 {
        /// Some thread is inside the critical section.
        const LOCKED    = 0b0000_0001;
        /// At least one thread is parked waiting for the monitor.
        const CONTENDED = 0b0000_0010;
        /// The holder has entered more than once.
        const RECURSIVE = 0b0000_0100;
    }
}

impl MonitorState {
    pub(crate) fn from_counts(held: bool, hold_count: usize, waiters: usize) -> Self {
        let mut state = MonitorState::empty();
        state.set(MonitorState::LOCKED, held);
        state.set(MonitorState::CONTENDED, waiters > 0);
        state.set(MonitorState::RECURSIVE, hold_count > 1);
        state
    }

    pub fn is_free(self) -> bool {
        !self.contains(MonitorState::LOCKED)
    }
}

#[test]
fn state_from_counts() {
    assert!(MonitorState::from_counts(false, 0, 0).is_free());
    assert_eq!(MonitorState::from_counts(true, 1, 0), MonitorState::LOCKED);
    assert_eq!(
        MonitorState::from_counts(true, 3, 2),
        MonitorState::LOCKED | MonitorState::CONTENDED | MonitorState::RECURSIVE
    );
}
