//! Storage port for rendered-page data.
//!
//! The cache stores the JSON form of a page's payload together with the time
//! it was fetched. Freshness is decided by the page service, not the cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by cache backends.
    pub enum PageCacheError {
        /// The backend failed to read or write.
        Backend { message: String } =>
            "page cache failed: {message}",
    }
}

/// A cached payload and the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    /// Decoded upstream payload.
    pub body: Value,
    /// When the payload was fetched.
    pub stored_at: DateTime<Utc>,
}

/// Store for public page payloads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CachedPage>, PageCacheError>;

    async fn put(&self, key: &str, page: CachedPage) -> Result<(), PageCacheError>;

    /// Drop `key` so the next request refetches.
    async fn invalidate(&self, key: &str) -> Result<(), PageCacheError>;
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPageCache;

#[async_trait]
impl PageCache for NoopPageCache {
    async fn get(&self, _key: &str) -> Result<Option<CachedPage>, PageCacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _page: CachedPage) -> Result<(), PageCacheError> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> Result<(), PageCacheError> {
        Ok(())
    }
}
