//! Process-local read metrics state.
//!
//! Nothing outside `obs` touches this directly; execution logic records
//! through the sink boundary.

use std::cell::RefCell;

///
/// ReadReport
///
/// Point-in-time snapshot of overlay read activity.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadReport {
    pub get_calls: u64,
    pub between_scans: u64,
    pub major_scans: u64,
    pub minor_scans: u64,
    pub key_set_scans: u64,
    /// Reads answered entirely by durable storage because the transaction
    /// never touched the index.
    pub delegated_reads: u64,
}

thread_local! {
    static STATE: RefCell<ReadReport> = RefCell::new(ReadReport::default());
}

pub(crate) fn with_state<R>(f: impl FnOnce(&ReadReport) -> R) -> R {
    STATE.with(|state| f(&state.borrow()))
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut ReadReport) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

pub(crate) fn reset() {
    with_state_mut(|state| *state = ReadReport::default());
}
