//! Portal entry-point: loads settings, wires adapters and serves pages and the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portal::inbound::http::health::HealthState;
use portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
use portal::settings::PortalSettings;
use server::{ServerConfig, UpstreamConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let env = DefaultEnv::new();
    let settings = PortalSettings::load_from_iter(std::env::args_os())
        .map_err(|e| eyre!("failed to load portal settings: {e}"))?;
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let api_base_url = settings.api_base_url(&env)?;
    let upstream = UpstreamConfig {
        upload_url: settings.upload_url(&api_base_url)?,
        api_base_url,
        request_timeout: settings.request_timeout(),
    };
    let config = ServerConfig::new(session, settings.bind_addr()?, upstream)
        .with_page_policies(settings.page_policies());
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .wrap_err_with(|| format!("failed to start server on {bind_addr}"))?;
    info!(%bind_addr, "portal listening");
    server.await?;
    Ok(())
}
