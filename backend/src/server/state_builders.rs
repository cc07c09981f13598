//! Builders wiring the outbound adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use portal::inbound::http::state::{HttpState, HttpStatePorts};
use portal::outbound::api::{ApiClient, HttpContentSource, HttpSubmissionGateway};
use portal::outbound::cache::InMemoryPageCache;
use portal::outbound::upload::HttpFileUploader;

use super::ServerConfig;

/// Build the adapter set for the configured upstream.
///
/// # Errors
/// Returns [`std::io::Error`] when an HTTP client cannot be constructed.
pub(super) fn build_ports(config: &ServerConfig) -> std::io::Result<HttpStatePorts> {
    let upstream = &config.upstream;
    let timeout = upstream.request_timeout;
    let client = Arc::new(
        ApiClient::new(upstream.api_base_url.clone(), timeout)
            .map_err(|e| std::io::Error::other(format!("API client setup failed: {e}")))?,
    );
    let uploader = HttpFileUploader::new(upstream.upload_url.clone(), timeout)
        .map_err(|e| std::io::Error::other(format!("upload client setup failed: {e}")))?;

    info!(
        api_base_url = %upstream.api_base_url,
        upload_url = %upstream.upload_url,
        timeout = ?upstream.request_timeout,
        "upstream adapters configured"
    );

    Ok(HttpStatePorts {
        content: Arc::new(HttpContentSource::new(client.clone())),
        gateway: Arc::new(HttpSubmissionGateway::new(client)),
        uploader: Arc::new(uploader),
        cache: Arc::new(InMemoryPageCache::new()),
        clock: Arc::new(DefaultClock),
    })
}

/// Build shared HTTP state, compiling the page templates once.
///
/// # Errors
/// Returns [`std::io::Error`] when adapters or templates fail to initialise.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ports = build_ports(config)?;
    let state = HttpState::new(ports, config.policies)
        .map_err(|e| std::io::Error::other(format!("template compilation failed: {e}")))?
        .with_session_ttl(config.session.ttl);
    Ok(web::Data::new(state))
}
