// luxd — local backlight control over sysfs

//! Error taxonomy, carrying the wire identifiers surfaced to API clients.

use thiserror::Error;

/// Failures of the synchronous brightness operations.
///
/// Device-missing, unreadable-attribute, and invalid-range conditions all
/// collapse into [`Unavailable`](Self::Unavailable): each means "cannot
/// currently report brightness" and the caller's remedy is the same. Write
/// failures stay distinct — they usually point at permissions.
#[derive(Debug, Error)]
pub enum BrightnessError {
    /// No backlight device, or its attributes cannot produce a valid reading.
    #[error("backlight unavailable: {0}")]
    Unavailable(String),
    /// The request itself is malformed (non-finite target value).
    #[error("invalid brightness argument: {0}")]
    InvalidArgument(String),
    /// A required write to the brightness attribute did not complete.
    #[error("brightness write failed: {0}")]
    Io(String),
}

impl BrightnessError {
    /// Wire-level identifier for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BrightnessError::Unavailable(_) => "UNAVAILABLE",
            BrightnessError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BrightnessError::Io(_) => "IO_ERROR",
        }
    }
}

/// Misuse of the change-stream lifecycle. Always a caller bug, never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("brightness stream already has a subscriber")]
    AlreadyListening,
    #[error("brightness stream has no active subscriber")]
    NotListening,
}

impl SubscribeError {
    /// Wire-level identifier for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SubscribeError::AlreadyListening => "ALREADY_LISTENING",
            SubscribeError::NotListening => "NOT_LISTENING",
        }
    }
}
