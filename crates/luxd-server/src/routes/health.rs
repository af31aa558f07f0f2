// luxd — local backlight control over sysfs

//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub device_present: bool,
}

/// GET /health — process liveness plus whether a backlight device exists.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        device_present: state.controller.device_present(),
    })
}
