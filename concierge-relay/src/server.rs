use crate::config::RelayConfig;
use crate::signaling::{RelayService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service)
}

/// Serve the relay on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, service: RelayService) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Signaling relay listening on ws://{}/ws", addr);

    axum::serve(listener, router(service))
        .await
        .context("Relay server stopped")?;
    Ok(())
}

pub async fn run(config: RelayConfig) -> Result<()> {
    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind relay to {}", config.bind))?;
    serve(listener, RelayService::new()).await
}
