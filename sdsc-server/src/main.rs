//! `sdsc-server`: the REST entry point for the SDS controller control
//! plane (§6, §6.1).

mod error;
mod routes;
mod seams;
mod state;

// Layer 1: Standard library imports
use std::env;

// Layer 2: Third-party crate imports
use tracing_subscriber::EnvFilter;

// Layer 3: Internal module imports
use sdsc_core::config::ControllerConfig;

use crate::state::ControllerCore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = env::var("SDSC_CONFIG_PATH").ok();
    let config = ControllerConfig::load(config_path.as_deref())?;
    tracing::info!(?config, "loaded controller configuration");

    let app_state = ControllerCore::bootstrap(config).await?;
    let app = routes::router(app_state);

    let port: u16 = env::var("SDSC_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "sdsc-server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
