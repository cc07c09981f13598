//! Domain primitives, services and ports.
//!
//! Purpose: define the portal's strongly typed forms and content entities,
//! the per-session state containers, and the services that drive the remote
//! API through port traits. Nothing here knows about HTTP or HTML.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - TraceId: request correlation identifier.
//! - PageService, SubmissionService: driving services used by handlers.
//! - SessionStore, StoreRegistry: per-session slices and upload state.

pub mod auth;
pub mod content;
pub mod error;
pub mod forms;
pub mod pages;
pub mod ports;
pub mod slice;
pub mod store;
pub mod submissions;
pub mod thunk;
pub mod trace_id;
pub mod upload;
pub mod validation;

pub use self::auth::{MemberRole, SignedInMember};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::pages::{CachePolicy, PageKey, PagePolicies, PageService};
pub use self::store::{SessionStore, StoreRegistry};
pub use self::submissions::SubmissionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::{UploadStatus, UploadTracker, UploadTriggerError};
pub use self::validation::{Issue, Issues};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use portal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
