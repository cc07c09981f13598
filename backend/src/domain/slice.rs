//! Shared client-state slices.
//!
//! A slice is a `{data, loading, error}` record mutated only through
//! [`SliceState::reduce`]. [`Slice`] wraps the record in a mutex so every
//! dispatch applies one whole reducer call; readers never observe a
//! half-applied action.
//!
//! Each dispatch cycle is tagged with a [`RequestId`]. Results tagged with a
//! superseded id are dropped, so when two loads overlap the most recently
//! started one decides the final state regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

/// Identifier of one dispatch cycle on a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Transitions a slice accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceAction<T> {
    /// A load started.
    Pending { request: RequestId },
    /// The load produced a payload.
    Fulfilled { request: RequestId, payload: T },
    /// The load failed with a displayable message.
    Rejected { request: RequestId, message: String },
    /// The load finished, successfully or not.
    Settled { request: RequestId },
    /// Drop all state.
    Reset,
}

/// Observable slice state.
///
/// `loading` and `error` may both be set while a retry is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceState<T> {
    /// Last fulfilled payload.
    pub data: Option<T>,
    /// A thunk is in flight.
    pub loading: bool,
    /// Message from the last rejection.
    pub error: Option<String>,
    #[serde(skip)]
    current: Option<RequestId>,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            current: None,
        }
    }
}

impl<T> SliceState<T> {
    /// Apply one action. Returns whether the state changed.
    pub fn reduce(&mut self, action: SliceAction<T>) -> bool {
        match action {
            SliceAction::Pending { request } => {
                self.current = Some(request);
                self.loading = true;
                true
            }
            SliceAction::Fulfilled { request, payload } => {
                if !self.is_current(request) {
                    return false;
                }
                self.data = Some(payload);
                self.error = None;
                true
            }
            SliceAction::Rejected { request, message } => {
                if !self.is_current(request) {
                    return false;
                }
                self.error = Some(message);
                true
            }
            SliceAction::Settled { request } => {
                if !self.is_current(request) {
                    return false;
                }
                self.loading = false;
                self.current = None;
                true
            }
            SliceAction::Reset => {
                *self = Self::default();
                true
            }
        }
    }

    fn is_current(&self, request: RequestId) -> bool {
        self.current == Some(request)
    }
}

/// A named slice guarded for concurrent dispatch.
#[derive(Debug)]
pub struct Slice<T> {
    name: &'static str,
    state: Mutex<SliceState<T>>,
    next_request: AtomicU64,
}

impl<T: Clone> Slice<T> {
    /// Empty slice named `name` for logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(SliceState::default()),
            next_request: AtomicU64::new(1),
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Allocate the id for a new dispatch cycle.
    pub fn begin(&self) -> RequestId {
        RequestId(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Apply `action` under the slice lock.
    pub fn dispatch(&self, action: SliceAction<T>) {
        let label = action_label(&action);
        let applied = self.lock().reduce(action);
        debug!(slice = self.name, action = label, applied, "slice dispatch");
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SliceState<T> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SliceState<T>> {
        // Reducer arms only assign plain fields; a poisoned guard still
        // holds a coherent record.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn action_label<T>(action: &SliceAction<T>) -> &'static str {
    match action {
        SliceAction::Pending { .. } => "pending",
        SliceAction::Fulfilled { .. } => "fulfilled",
        SliceAction::Rejected { .. } => "rejected",
        SliceAction::Settled { .. } => "settled",
        SliceAction::Reset => "reset",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_then_fulfilled_then_settled() {
        let slice: Slice<u32> = Slice::new("counter");
        let request = slice.begin();
        slice.dispatch(SliceAction::Pending { request });
        assert!(slice.snapshot().loading);
        slice.dispatch(SliceAction::Fulfilled { request, payload: 7 });
        let mid = slice.snapshot();
        assert_eq!(mid.data, Some(7));
        assert!(mid.loading, "loading is cleared only by the settle action");
        slice.dispatch(SliceAction::Settled { request });
        assert!(!slice.snapshot().loading);
    }

    #[test]
    fn rejection_keeps_previous_data() {
        let mut state = SliceState::default();
        let first = RequestId(1);
        state.reduce(SliceAction::Pending { request: first });
        state.reduce(SliceAction::Fulfilled { request: first, payload: "old" });
        state.reduce(SliceAction::Settled { request: first });

        let second = RequestId(2);
        state.reduce(SliceAction::Pending { request: second });
        state.reduce(SliceAction::Rejected {
            request: second,
            message: "boom".to_owned(),
        });
        state.reduce(SliceAction::Settled { request: second });

        assert_eq!(state.data, Some("old"));
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert!(!state.loading);
    }

    #[test]
    fn superseded_results_are_ignored() {
        let mut state = SliceState::default();
        let (older, newer) = (RequestId(1), RequestId(2));
        state.reduce(SliceAction::Pending { request: older });
        state.reduce(SliceAction::Pending { request: newer });

        assert!(state.reduce(SliceAction::Fulfilled { request: newer, payload: 2 }));
        assert!(state.reduce(SliceAction::Settled { request: newer }));
        assert!(!state.reduce(SliceAction::Fulfilled { request: older, payload: 1 }));
        assert!(!state.reduce(SliceAction::Settled { request: older }));

        assert_eq!(state.data, Some(2));
        assert!(!state.loading);
    }

    #[test]
    fn stale_settle_does_not_clear_a_newer_load() {
        let mut state: SliceState<u8> = SliceState::default();
        let (older, newer) = (RequestId(1), RequestId(2));
        state.reduce(SliceAction::Pending { request: older });
        state.reduce(SliceAction::Pending { request: newer });
        state.reduce(SliceAction::Settled { request: older });
        assert!(state.loading);
    }

    #[test]
    fn reset_clears_everything() {
        let slice: Slice<u8> = Slice::new("reset");
        let request = slice.begin();
        slice.dispatch(SliceAction::Pending { request });
        slice.dispatch(SliceAction::Reset);
        assert_eq!(slice.snapshot(), SliceState::default());
    }

    #[test]
    fn request_ids_increase() {
        let slice: Slice<u8> = Slice::new("ids");
        assert!(slice.begin() < slice.begin());
    }
}
