//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::web;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::PagePolicies;
use crate::domain::ports::{
    ContentSource, FixtureContentSource, FixtureFileUploader, FileUploader, NoopPageCache,
    PageCache, SubmissionGateway,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Session middleware with a fresh key, cookie name `session` and `Secure`
/// disabled for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Clock pinned to one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(
            Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0)
                .single()
                .unwrap_or_else(Utc::now),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Ports used by handler tests; swap individual fields for mocks.
pub struct TestPorts {
    /// Content source; fixture data by default.
    pub content: Arc<dyn ContentSource>,
    /// Submission gateway under test.
    pub gateway: Arc<dyn SubmissionGateway>,
    /// Uploader; a fixture by default.
    pub uploader: Arc<dyn FileUploader>,
    /// Page cache; stores nothing by default.
    pub cache: Arc<dyn PageCache>,
}

impl TestPorts {
    /// Fixture ports around `gateway`.
    pub fn with_gateway(gateway: impl SubmissionGateway + 'static) -> Self {
        Self {
            content: Arc::new(FixtureContentSource),
            gateway: Arc::new(gateway),
            uploader: Arc::new(FixtureFileUploader),
            cache: Arc::new(NoopPageCache),
        }
    }

    /// Build handler state with a fixed clock.
    pub fn into_state(self) -> web::Data<HttpState> {
        let state = HttpState::new(
            HttpStatePorts {
                content: self.content,
                gateway: self.gateway,
                uploader: self.uploader,
                cache: self.cache,
                clock: Arc::new(FixedClock::default()),
            },
            PagePolicies::default(),
        )
        .unwrap_or_else(|error| panic!("templates compile: {error}"));
        web::Data::new(state)
    }
}
