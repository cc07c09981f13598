//! Page data service for server-rendered pages.
//!
//! Each public page maps to one [`PageKey`] and one [`CachePolicy`]. The
//! service consults the [`PageCache`] port before calling the
//! [`ContentSource`], refetches stale entries, and serves a stale entry when
//! its refetch fails.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::content::{AboutPage, BlogPost, Event, Faq, Project};
use super::ports::{CachedPage, ContentSource, ContentSourceError, PageCache};

/// How long a fetched page stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Fetch on every request.
    NoStore,
    /// Serve from cache until the window elapses.
    Revalidate(Duration),
    /// Serve from cache until the process restarts.
    Forever,
}

impl CachePolicy {
    /// Whether responses under this policy are cached at all.
    pub fn stores(self) -> bool {
        !matches!(self, Self::NoStore)
    }

    /// Whether an entry stored at `stored_at` may still be served at `now`.
    pub fn is_fresh(self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::NoStore => false,
            Self::Forever => true,
            Self::Revalidate(window) => TimeDelta::from_std(window)
                .map_or(true, |window| now.signed_duration_since(stored_at) < window),
        }
    }
}

/// Cacheable public pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKey {
    About,
    Faqs,
    Blogs,
    Projects,
    Events,
}

impl PageKey {
    /// Every cached page.
    pub const ALL: [Self; 5] = [
        Self::About,
        Self::Faqs,
        Self::Blogs,
        Self::Projects,
        Self::Events,
    ];

    /// Cache key for the page.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Faqs => "faqs",
            Self::Blogs => "blogs",
            Self::Projects => "projects",
            Self::Events => "events",
        }
    }
}

/// Policy per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePolicies {
    /// About page.
    pub about: CachePolicy,
    /// FAQ list.
    pub faqs: CachePolicy,
    /// Blog index.
    pub blogs: CachePolicy,
    /// Project list.
    pub projects: CachePolicy,
    /// Event list.
    pub events: CachePolicy,
}

impl Default for PagePolicies {
    fn default() -> Self {
        Self {
            about: CachePolicy::Revalidate(Duration::from_secs(3600)),
            faqs: CachePolicy::Forever,
            blogs: CachePolicy::Revalidate(Duration::from_secs(60)),
            projects: CachePolicy::Revalidate(Duration::from_secs(3600)),
            events: CachePolicy::NoStore,
        }
    }
}

impl PagePolicies {
    /// Policy for `key`.
    pub fn for_key(&self, key: PageKey) -> CachePolicy {
        match key {
            PageKey::About => self.about,
            PageKey::Faqs => self.faqs,
            PageKey::Blogs => self.blogs,
            PageKey::Projects => self.projects,
            PageKey::Events => self.events,
        }
    }
}

/// Fetches page payloads through the cache.
#[derive(Clone)]
pub struct PageService {
    content: Arc<dyn ContentSource>,
    cache: Arc<dyn PageCache>,
    clock: Arc<dyn Clock>,
    policies: PagePolicies,
}

impl PageService {
    /// Service reading through `cache` before `content`.
    pub fn new(
        content: Arc<dyn ContentSource>,
        cache: Arc<dyn PageCache>,
        clock: Arc<dyn Clock>,
        policies: PagePolicies,
    ) -> Self {
        Self {
            content,
            cache,
            clock,
            policies,
        }
    }

    /// Policy for `key`.
    pub fn policy(&self, key: PageKey) -> CachePolicy {
        self.policies.for_key(key)
    }

    /// About page content.
    pub async fn about(&self) -> Result<AboutPage, ContentSourceError> {
        self.load(PageKey::About, || self.content.fetch_about_data())
            .await
    }

    /// FAQ entries.
    pub async fn faqs(&self) -> Result<Vec<Faq>, ContentSourceError> {
        self.load(PageKey::Faqs, || self.content.fetch_faqs()).await
    }

    /// Blog posts.
    pub async fn blogs(&self) -> Result<Vec<BlogPost>, ContentSourceError> {
        self.load(PageKey::Blogs, || self.content.fetch_blogs()).await
    }

    /// Projects.
    pub async fn projects(&self) -> Result<Vec<Project>, ContentSourceError> {
        self.load(PageKey::Projects, || self.content.fetch_projects_data())
            .await
    }

    /// Events; never cached by default.
    pub async fn events(&self) -> Result<Vec<Event>, ContentSourceError> {
        self.load(PageKey::Events, || self.content.fetch_events())
            .await
    }

    /// Drop the cached entry for `key`. Cache failures are logged only.
    pub async fn invalidate(&self, key: PageKey) {
        if let Err(error) = self.cache.invalidate(key.as_str()).await {
            warn!(page = key.as_str(), %error, "page cache invalidation failed");
        }
    }

    async fn load<T, F, Fut>(&self, key: PageKey, fetch: F) -> Result<T, ContentSourceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ContentSourceError>>,
    {
        let policy = self.policy(key);
        let now = self.clock.utc();
        let stale = if policy.stores() {
            match self.cached::<T>(key).await {
                Some((value, stored_at)) if policy.is_fresh(stored_at, now) => {
                    debug!(page = key.as_str(), "serving cached page");
                    return Ok(value);
                }
                other => other,
            }
        } else {
            None
        };

        match fetch().await {
            Ok(value) => {
                if policy.stores() {
                    self.store(key, &value, now).await;
                }
                Ok(value)
            }
            Err(error) => match stale {
                Some((value, stored_at)) => {
                    warn!(
                        page = key.as_str(),
                        %error,
                        stored_at = %stored_at,
                        "refetch failed; serving stale page"
                    );
                    Ok(value)
                }
                None => Err(error),
            },
        }
    }

    async fn cached<T: DeserializeOwned>(&self, key: PageKey) -> Option<(T, DateTime<Utc>)> {
        let page = match self.cache.get(key.as_str()).await {
            Ok(page) => page?,
            Err(error) => {
                warn!(page = key.as_str(), %error, "page cache read failed");
                return None;
            }
        };
        match serde_json::from_value(page.body) {
            Ok(value) => Some((value, page.stored_at)),
            Err(error) => {
                warn!(page = key.as_str(), %error, "discarding undecodable cache entry");
                self.invalidate(key).await;
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: PageKey, value: &T, now: DateTime<Utc>) {
        let body = match serde_json::to_value(value) {
            Ok(body) => body,
            Err(error) => {
                warn!(page = key.as_str(), %error, "page payload is not cacheable");
                return;
            }
        };
        let page = CachedPage {
            body,
            stored_at: now,
        };
        if let Err(error) = self.cache.put(key.as_str(), page).await {
            warn!(page = key.as_str(), %error, "page cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockContentSource, MockPageCache, NoopPageCache};
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn blog(title: &str) -> BlogPost {
        serde_json::from_value(json!({
            "id": "b1",
            "title": title,
            "slug": "post",
        }))
        .expect("blog fixture")
    }

    fn service(
        content: MockContentSource,
        cache: impl PageCache + 'static,
        now: DateTime<Utc>,
    ) -> PageService {
        PageService::new(
            Arc::new(content),
            Arc::new(cache),
            Arc::new(FixedClock::at(now)),
            PagePolicies::default(),
        )
    }

    #[rstest]
    #[case(CachePolicy::NoStore, 0, false)]
    #[case(CachePolicy::Forever, 1_000_000, true)]
    #[case(CachePolicy::Revalidate(Duration::from_secs(60)), 59, true)]
    #[case(CachePolicy::Revalidate(Duration::from_secs(60)), 60, false)]
    fn freshness_follows_the_policy(
        now: DateTime<Utc>,
        #[case] policy: CachePolicy,
        #[case] age_secs: i64,
        #[case] fresh: bool,
    ) {
        let stored_at = now - TimeDelta::seconds(age_secs);
        assert_eq!(policy.is_fresh(stored_at, now), fresh);
    }

    #[rstest]
    #[tokio::test]
    async fn fresh_entry_skips_the_fetch(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content.expect_fetch_blogs().never();
        let mut cache = MockPageCache::new();
        let body = serde_json::to_value(vec![blog("cached")]).expect("encode");
        cache.expect_get().returning(move |_| {
            Ok(Some(CachedPage {
                body: body.clone(),
                stored_at: now - TimeDelta::seconds(10),
            }))
        });

        let blogs = service(content, cache, now).blogs().await.expect("cached");
        assert_eq!(blogs, vec![blog("cached")]);
    }

    #[rstest]
    #[tokio::test]
    async fn stale_entry_is_served_when_refetch_fails(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content
            .expect_fetch_blogs()
            .times(1)
            .returning(|| Err(ContentSourceError::transport("connection refused")));
        let mut cache = MockPageCache::new();
        let body = serde_json::to_value(vec![blog("stale")]).expect("encode");
        cache.expect_get().returning(move |_| {
            Ok(Some(CachedPage {
                body: body.clone(),
                stored_at: now - TimeDelta::hours(2),
            }))
        });
        cache.expect_put().never();

        let blogs = service(content, cache, now).blogs().await.expect("stale");
        assert_eq!(blogs, vec![blog("stale")]);
    }

    #[rstest]
    #[tokio::test]
    async fn refetched_entry_replaces_the_stale_one(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content
            .expect_fetch_blogs()
            .returning(|| Ok(vec![blog("fresh")]));
        let mut cache = MockPageCache::new();
        cache.expect_get().returning(move |_| {
            Ok(Some(CachedPage {
                body: json!([]),
                stored_at: now - TimeDelta::hours(2),
            }))
        });
        cache
            .expect_put()
            .withf(move |key: &str, page: &CachedPage| key == "blogs" && page.stored_at == now)
            .times(1)
            .returning(|_, _| Ok(()));

        let blogs = service(content, cache, now).blogs().await.expect("fresh");
        assert_eq!(blogs, vec![blog("fresh")]);
    }

    #[rstest]
    #[tokio::test]
    async fn events_never_touch_the_cache(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content.expect_fetch_events().returning(|| Ok(Vec::new()));
        let mut cache = MockPageCache::new();
        cache.expect_get().never();
        cache.expect_put().never();

        let events = service(content, cache, now).events().await.expect("events");
        assert!(events.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn failure_without_cache_is_returned(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content
            .expect_fetch_about_data()
            .returning(|| Err(ContentSourceError::status(500_u16, "boom")));

        let err = service(content, NoopPageCache, now)
            .about()
            .await
            .expect_err("no fallback");
        assert_eq!(err, ContentSourceError::status(500_u16, "boom"));
    }

    #[rstest]
    #[tokio::test]
    async fn cache_read_errors_fall_through_to_fetch(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content.expect_fetch_faqs().returning(|| Ok(Vec::new()));
        let mut cache = MockPageCache::new();
        cache
            .expect_get()
            .returning(|_| Err(crate::domain::ports::PageCacheError::backend("offline")));
        cache.expect_put().returning(|_, _| Ok(()));

        let faqs = service(content, cache, now).faqs().await.expect("faqs");
        assert!(faqs.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn undecodable_entries_are_invalidated(now: DateTime<Utc>) {
        let mut content = MockContentSource::new();
        content
            .expect_fetch_projects_data()
            .returning(|| Ok(Vec::new()));
        let mut cache = MockPageCache::new();
        cache.expect_get().returning(move |_| {
            Ok(Some(CachedPage {
                body: json!({ "not": "a list" }),
                stored_at: now,
            }))
        });
        cache
            .expect_invalidate()
            .withf(|key: &str| key == "projects")
            .times(1)
            .returning(|_| Ok(()));
        cache.expect_put().times(1).returning(|_, _| Ok(()));

        let projects = service(content, cache, now).projects().await.expect("refetched");
        assert!(projects.is_empty());
    }
}
