//! Cache-control headers for HTTP handlers.

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

use crate::domain::CachePolicy;

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

const FOREVER_MAX_AGE_SECS: u64 = 31_536_000;

/// Header tuple for session-bound and JSON responses.
pub const fn private_no_cache_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

/// Header value matching a page's cache policy.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use portal::domain::CachePolicy;
/// use portal::inbound::http::cache_control::page_cache_control;
///
/// assert_eq!(page_cache_control(CachePolicy::NoStore), "no-store");
/// assert_eq!(
///     page_cache_control(CachePolicy::Revalidate(Duration::from_secs(60))),
///     "public, max-age=60, must-revalidate"
/// );
/// ```
pub fn page_cache_control(policy: CachePolicy) -> String {
    match policy {
        CachePolicy::NoStore => "no-store".to_owned(),
        CachePolicy::Revalidate(window) => {
            format!("public, max-age={}, must-revalidate", window.as_secs())
        }
        CachePolicy::Forever => format!("public, max-age={FOREVER_MAX_AGE_SECS}"),
    }
}

/// Header tuple for a page with `policy`.
pub fn page_cache_header(policy: CachePolicy) -> (HeaderName, String) {
    (CACHE_CONTROL, page_cache_control(policy))
}
