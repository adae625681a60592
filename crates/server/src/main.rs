//! Relying party binary
//!
//! Loads configuration (`.env`, environment, then config file), discovers the
//! provider and serves the login routes until Ctrl-C.

use std::time::Duration;

use anyhow::{Context, Result};
use oidc_rp_server::{logging, router, spawn_session_reaper, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment or a config file may suffice.
    let dotenv = dotenvy::dotenv();
    logging::init().context("failed to initialise logging")?;
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded .env");
    }

    let config = oidc_rp_infra::config::load().context("failed to load configuration")?;
    info!(
        issuer = %config.issuer_url,
        client_id = %config.client_id,
        redirect_uri = %config.redirect_uri,
        "Starting relying party"
    );

    let state = AppState::bootstrap(&config).await.context("provider discovery failed")?;
    let reaper = spawn_session_reaper(
        state.sessions.clone(),
        Duration::from_secs(config.session_idle_timeout_seconds),
    );

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    reaper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("Graceful shutdown initiated");
}
