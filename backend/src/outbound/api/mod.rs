//! Remote REST API adapters.
//!
//! [`ApiClient`] is the single configured HTTP client; the content and
//! submission adapters translate its errors into port errors.

mod client;
mod content;
mod submissions;

pub use client::{ApiClient, ApiClientError};
pub use content::HttpContentSource;
pub use submissions::HttpSubmissionGateway;
