// luxd — local backlight control over sysfs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use luxd_core::{BrightnessController, BrightnessMonitor, MonitorConfig};
use luxd_server::{run, AppState, Cli};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        "starting luxd (backlight dir: {})",
        cli.backlight_dir.display()
    );

    let controller = BrightnessController::new(&cli.backlight_dir)
        .with_settle_delay(Duration::from_millis(cli.settle_delay_ms));
    if !controller.device_present() {
        // The device can appear later (module load, hotplug); every
        // operation re-resolves it.
        warn!(
            "no backlight device under {}",
            cli.backlight_dir.display()
        );
    }

    let monitor = BrightnessMonitor::new(MonitorConfig {
        backlight_dir: cli.backlight_dir.clone(),
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        ..MonitorConfig::default()
    });

    let state = AppState {
        controller,
        monitor: Arc::new(monitor),
    };
    run(SocketAddr::new(cli.host, cli.port), state).await
}
