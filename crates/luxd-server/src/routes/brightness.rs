// luxd — local backlight control over sysfs

//! Brightness endpoints.
//!
//! `GET  /brightness`          — current fraction of the device maximum.
//! `POST /brightness`          — set a target fraction (clamped to the range).
//! `GET  /brightness/writable` — whether this process may set brightness.
//! `GET  /brightness/stream`   — SSE change stream; one subscriber at a time.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use luxd_core::{BrightnessEvent, BrightnessMonitor};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use super::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct BrightnessReading {
    pub brightness: f64,
}

#[derive(Debug, Deserialize)]
pub struct SetBrightnessRequest {
    pub brightness: f64,
}

#[derive(Debug, Serialize)]
pub struct WritableResponse {
    pub writable: bool,
}

#[derive(Debug, Serialize)]
struct StreamErrorPayload {
    code: &'static str,
    message: String,
}

/// GET /brightness — read the current value.
pub async fn get_brightness(
    State(state): State<AppState>,
) -> Result<Json<BrightnessReading>, ApiError> {
    let brightness = state.controller.brightness()?;
    Ok(Json(BrightnessReading { brightness }))
}

/// POST /brightness — set a target value.
///
/// Runs on the blocking pool: a target of zero sleeps for the settle delay
/// between its two writes.
pub async fn set_brightness(
    State(state): State<AppState>,
    body: Result<Json<SetBrightnessRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::invalid_argument(rejection.body_text()))?;
    let controller = state.controller.clone();
    tokio::task::spawn_blocking(move || controller.set_brightness(request.brightness))
        .await
        .map_err(|e| ApiError::io(format!("set-brightness task failed: {e}")))??;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /brightness/writable — permission probe, never mutates the value.
pub async fn get_writable(State(state): State<AppState>) -> Json<WritableResponse> {
    Json(WritableResponse {
        writable: state.controller.can_set_brightness(),
    })
}

/// GET /brightness/stream — attach the single change-stream subscriber.
///
/// The state at connect time arrives as the first event; afterwards an
/// event is sent only when the value moves by more than the configured
/// epsilon, or on device loss/recovery. A second concurrent subscriber is
/// refused with 409 `ALREADY_LISTENING`. Disconnecting cancels the
/// subscription and frees the slot.
pub async fn stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (tx, rx) = mpsc::unbounded_channel();
    state.monitor.listen(tx)?;
    let guard = CancelOnDisconnect(state.monitor.clone());

    let stream = UnboundedReceiverStream::new(rx).map(move |event| {
        let _keep_alive = &guard;
        Ok(match event {
            BrightnessEvent::Changed(brightness) => {
                sse_event("brightness", &BrightnessReading { brightness })
            }
            BrightnessEvent::Unavailable { message } => sse_event(
                "error",
                &StreamErrorPayload {
                    code: "UNAVAILABLE",
                    message,
                },
            ),
        })
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Cancels the monitor subscription when the SSE stream is dropped.
struct CancelOnDisconnect(Arc<BrightnessMonitor>);

impl Drop for CancelOnDisconnect {
    fn drop(&mut self) {
        // Joins the poll thread; bounded by one poll interval.
        if self.0.cancel().is_ok() {
            debug!("brightness stream subscriber disconnected");
        }
    }
}

fn sse_event(name: &str, data: &impl Serialize) -> Event {
    match serde_json::to_string(data) {
        Ok(json) => Event::default().event(name).data(json),
        Err(e) => Event::default().event("error").data(format!(
            r#"{{"code":"IO_ERROR","message":"event serialization failed: {e}"}}"#
        )),
    }
}
