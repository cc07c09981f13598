//! Async actions that wrap a fetch in slice transitions.

use std::fmt::Display;
use std::future::Future;

use tracing::{Instrument, debug_span, warn};

use super::slice::{Slice, SliceAction};

/// Run `fetch` against `slice`.
///
/// Dispatch order is fixed: `Pending` first, then exactly one of `Fulfilled`
/// (data replaced, error cleared) or `Rejected` (error set, data kept), then
/// `Settled` (loading cleared). The fetch result is also returned so callers
/// can branch on it without re-reading the slice.
///
/// # Errors
/// Returns the fetch error unchanged after recording its message.
///
/// # Examples
/// ```
/// use portal::domain::slice::Slice;
/// use portal::domain::thunk::run_thunk;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let slice: Slice<Vec<&str>> = Slice::new("members");
/// let result = run_thunk(&slice, async { Ok::<_, String>(vec!["ada"]) }).await;
/// assert!(result.is_ok());
/// let state = slice.snapshot();
/// assert_eq!(state.data, Some(vec!["ada"]));
/// assert!(!state.loading);
/// # });
/// ```
pub async fn run_thunk<T, E, Fut>(slice: &Slice<T>, fetch: Fut) -> Result<T, E>
where
    T: Clone,
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    let request = slice.begin();
    let span = debug_span!("thunk", slice = slice.name(), request = ?request);
    async {
        slice.dispatch(SliceAction::Pending { request });
        let outcome = fetch.await;
        match &outcome {
            Ok(payload) => slice.dispatch(SliceAction::Fulfilled {
                request,
                payload: payload.clone(),
            }),
            Err(error) => {
                let message = error.to_string();
                warn!(slice = slice.name(), error = %message, "thunk rejected");
                slice.dispatch(SliceAction::Rejected { request, message });
            }
        }
        slice.dispatch(SliceAction::Settled { request });
        outcome
    }
    .instrument(span)
    .await
}
