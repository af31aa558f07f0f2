// luxd — local backlight control over sysfs

//! HTTP route handlers and the wire error envelope.

pub mod brightness;
pub mod health;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use luxd_core::{BrightnessError, SubscribeError};
use serde::Serialize;

/// Error envelope returned by every failing endpoint:
/// `{"code": "<WIRE_CODE>", "message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_ARGUMENT",
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "IO_ERROR",
            message: message.into(),
        }
    }
}

impl From<BrightnessError> for ApiError {
    fn from(err: BrightnessError) -> Self {
        let status = match &err {
            BrightnessError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BrightnessError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            BrightnessError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<SubscribeError> for ApiError {
    fn from(err: SubscribeError) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
