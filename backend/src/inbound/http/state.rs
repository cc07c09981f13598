//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see domain services,
//! so they stay testable without network I/O.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;

use crate::domain::ports::{ContentSource, FileUploader, PageCache, SubmissionGateway};
use crate::domain::{
    Error, PagePolicies, PageService, SessionStore, StoreRegistry, SubmissionService,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::views::Views;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Remote content reads.
    pub content: Arc<dyn ContentSource>,
    /// Remote form submissions.
    pub gateway: Arc<dyn SubmissionGateway>,
    /// Document uploads.
    pub uploader: Arc<dyn FileUploader>,
    /// Cache for public pages.
    pub cache: Arc<dyn PageCache>,
    /// Time source for cache freshness.
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Cached public page reads.
    pub pages: PageService,
    /// Validated submissions.
    pub submissions: SubmissionService,
    /// Uncached reads for session pages.
    pub content: Arc<dyn ContentSource>,
    /// Per-session slice stores.
    pub stores: Arc<StoreRegistry>,
    /// Compiled page templates.
    pub views: Arc<Views>,
}

impl HttpState {
    /// Wire services over `ports` and compile the page templates.
    pub fn new(ports: HttpStatePorts, policies: PagePolicies) -> Result<Self, tera::Error> {
        let HttpStatePorts {
            content,
            gateway,
            uploader,
            cache,
            clock,
        } = ports;

        Ok(Self {
            pages: PageService::new(content.clone(), cache, Arc::clone(&clock), policies),
            submissions: SubmissionService::new(gateway),
            content,
            stores: Arc::new(StoreRegistry::new(uploader, clock)),
            views: Arc::new(Views::new()?),
        })
    }
}

impl HttpState {
    /// Evict session stores idle for longer than the session cookie `ttl`.
    ///
    /// Call before the state is shared; existing stores are discarded.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        let registry = self.stores.rebuilt().with_idle_ttl(ttl);
        self.stores = Arc::new(registry);
        self
    }

    /// Slice store bound to the session's store key.
    pub fn store_for(&self, session: &SessionContext) -> Result<Arc<SessionStore>, Error> {
        let key = session.ensure_store_key()?;
        Ok(self.stores.for_session(&key))
    }
}
