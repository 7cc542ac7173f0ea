//! Backend entry-point: loads configuration, assembles state and serves HTTP.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use masters_backend::inbound::http::health::HealthState;
use server::{AppSettings, ServerConfig, build_http_state, create_server, load_cookie_settings};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let cookies = load_cookie_settings().map_err(std::io::Error::other)?;
    info!(
        fingerprint = %cookies.fingerprint(),
        ephemeral = cookies.ephemeral_key,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let session_ttl = settings.session_ttl().map_err(std::io::Error::other)?;
    let http_state = build_http_state(&settings)
        .await
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(cookies, bind_addr, session_ttl);
    let server = create_server(health_state, web::Data::new(http_state), config)?;
    info!(%bind_addr, "listening");
    server.await
}
