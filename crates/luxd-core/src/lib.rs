// luxd — local backlight control over sysfs

//! Core device layer for luxd: sysfs backlight discovery, synchronous
//! brightness control, and the single-subscriber change monitor.
//!
//! ```text
//! sysfs.rs      — device discovery + integer attribute I/O
//! controller.rs — get / set (zero-write workaround) / writability probe
//! monitor.rs    — poll thread, change detection, listen/cancel lifecycle
//! error.rs      — wire-coded error taxonomy
//! ```

pub mod controller;
pub mod error;
pub mod monitor;
pub mod sysfs;

pub use controller::{BrightnessController, DEFAULT_SETTLE_DELAY};
pub use error::{BrightnessError, SubscribeError};
pub use monitor::{
    BrightnessEvent, BrightnessMonitor, MonitorConfig, DEFAULT_CHANGE_EPSILON,
    DEFAULT_POLL_INTERVAL,
};
