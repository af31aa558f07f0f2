// luxd — local backlight control over sysfs

//! Command-line interface for the luxd daemon.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

/// Local backlight brightness daemon.
///
/// Serves the first sysfs backlight device over a small HTTP API with a
/// single-subscriber change-notification stream.
#[derive(Parser, Debug, Clone)]
#[command(name = "luxd", version, about)]
pub struct Cli {
    /// Address to bind the HTTP API on.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port for the HTTP API.
    #[arg(long, default_value_t = 3838)]
    pub port: u16,

    /// Sysfs class directory scanned for backlight devices.
    #[arg(long, default_value = luxd_core::sysfs::DEFAULT_BACKLIGHT_DIR)]
    pub backlight_dir: PathBuf,

    /// Milliseconds between change-stream poll samples.
    #[arg(long, default_value_t = luxd_core::DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// Milliseconds between the two writes used when setting brightness to
    /// zero.
    #[arg(long, default_value_t = luxd_core::DEFAULT_SETTLE_DELAY.as_millis() as u64)]
    pub settle_delay_ms: u64,
}
