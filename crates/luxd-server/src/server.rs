// luxd — local backlight control over sysfs

//! HTTP server assembly — shared state, router, and serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::Router;
use luxd_core::{BrightnessController, BrightnessMonitor};
use tracing::info;

use crate::routes;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub controller: BrightnessController,
    pub monitor: Arc<BrightnessMonitor>,
}

/// Build the luxd router over `state`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/brightness",
            get(routes::brightness::get_brightness).post(routes::brightness::set_brightness),
        )
        .route(
            "/brightness/writable",
            get(routes::brightness::get_writable),
        )
        .route("/brightness/stream", get(routes::brightness::stream))
        .with_state(state)
}

/// Serve the API until a shutdown signal arrives.
pub async fn run(addr: SocketAddr, state: AppState) -> Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("luxd API listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => tracing::error!("failed to listen for shutdown signal: {e}"),
    }
}
