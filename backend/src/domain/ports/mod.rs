//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe what the domain needs from driven adapters: the remote
//! content API, the submission endpoints, file storage and the page cache.
//! Each trait exposes a typed error enum so adapters map transport failures
//! into predictable variants.

mod macros;

mod content_source;
mod file_uploader;
mod page_cache;
mod submission_gateway;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use content_source::MockContentSource;
pub use content_source::{ContentSource, ContentSourceError, FixtureContentSource};
#[cfg(test)]
pub use file_uploader::MockFileUploader;
pub use file_uploader::{FileUploadError, FileUploader, FixtureFileUploader, UploadFile};
#[cfg(test)]
pub use page_cache::MockPageCache;
pub use page_cache::{CachedPage, NoopPageCache, PageCache, PageCacheError};
#[cfg(test)]
pub use submission_gateway::MockSubmissionGateway;
pub use submission_gateway::{SubmissionError, SubmissionGateway};
