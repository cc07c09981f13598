//! In-process page cache.
//!
//! Entries live until they are overwritten, invalidated, or the process
//! exits. Freshness is decided by the page service from `stored_at`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{CachedPage, PageCache, PageCacheError};

/// Process-local [`PageCache`] keyed by page name.
#[derive(Debug, Default)]
pub struct InMemoryPageCache {
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl InMemoryPageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &str) -> Result<Option<CachedPage>, PageCacheError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, page: CachedPage) -> Result<(), PageCacheError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), page);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), PageCacheError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn page() -> CachedPage {
        CachedPage {
            body: json!({ "title": "About" }),
            stored_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn stores_and_returns_entries(page: CachedPage) {
        let cache = InMemoryPageCache::new();
        assert!(cache.get("about").await.expect("get").is_none());

        cache.put("about", page.clone()).await.expect("put");

        assert_eq!(cache.get("about").await.expect("get"), Some(page));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn invalidation_removes_only_the_key(page: CachedPage) {
        let cache = InMemoryPageCache::new();
        cache.put("about", page.clone()).await.expect("put");
        cache.put("faqs", page).await.expect("put");

        cache.invalidate("about").await.expect("invalidate");

        assert!(cache.get("about").await.expect("get").is_none());
        assert!(cache.get("faqs").await.expect("get").is_some());
    }
}
