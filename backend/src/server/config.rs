//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use portal::domain::PagePolicies;
use portal::inbound::http::session_config::SessionSettings;
use url::Url;

/// Where the portal's driven adapters send their requests.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the remote REST API.
    pub api_base_url: Url,
    /// Multipart upload endpoint.
    pub upload_url: Url,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upstream: UpstreamConfig,
    pub(crate) policies: PagePolicies,
}

impl ServerConfig {
    /// Create a configuration with default page policies.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, upstream: UpstreamConfig) -> Self {
        Self {
            session,
            bind_addr,
            upstream,
            policies: PagePolicies::default(),
        }
    }

    /// Override the per-page cache policies.
    #[must_use]
    pub fn with_page_policies(mut self, policies: PagePolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
