// luxd — local backlight control over sysfs

//! Change monitor — a single-subscriber notification stream for brightness.
//!
//! `listen` attaches the one permitted subscriber, delivers the state at
//! call time immediately, and starts a dedicated poll thread; `cancel`
//! stops the thread and joins it before returning, so nothing is sent to
//! the sink after cancellation. Device loss does not end the subscription:
//! the loop keeps polling and reports recovery when the device comes back.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::error::SubscribeError;
use crate::sysfs;

/// Default pause between poll samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default minimum delta for a sample to count as a change; smaller moves
/// are treated as read noise and suppressed.
pub const DEFAULT_CHANGE_EPSILON: f64 = 0.001;

/// A brightness notification delivered to the subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum BrightnessEvent {
    /// The brightness fraction changed (or was first observed).
    Changed(f64),
    /// The device became (or was found) unavailable.
    Unavailable { message: String },
}

/// Tunables for [`BrightnessMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sysfs class directory scanned for the backlight device.
    pub backlight_dir: PathBuf,
    /// Pause between poll samples.
    pub poll_interval: Duration,
    /// Minimum delta for a sample to count as a change.
    pub change_epsilon: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backlight_dir: PathBuf::from(sysfs::DEFAULT_BACKLIGHT_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
            change_epsilon: DEFAULT_CHANGE_EPSILON,
        }
    }
}

/// Single-subscriber brightness change monitor.
pub struct BrightnessMonitor {
    config: MonitorConfig,
    subscription: Mutex<Option<Subscription>>,
}

struct Subscription {
    stop: Arc<AtomicBool>,
    poll_thread: JoinHandle<()>,
}

impl BrightnessMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            subscription: Mutex::new(None),
        }
    }

    /// Whether a subscriber is currently attached.
    pub fn is_listening(&self) -> bool {
        self.subscription.lock().is_some()
    }

    /// Attach the single permitted subscriber.
    ///
    /// The state at call time is delivered through `sink` before this
    /// returns — a value event, or an unavailable event when the device
    /// cannot be read — so the subscriber never waits a full poll interval
    /// for its first notification. Polling then continues on a background
    /// thread until [`cancel`](Self::cancel) or drop.
    pub fn listen(&self, sink: UnboundedSender<BrightnessEvent>) -> Result<(), SubscribeError> {
        let mut subscription = self.subscription.lock();
        if subscription.is_some() {
            return Err(SubscribeError::AlreadyListening);
        }

        let last_known = sample(&self.config.backlight_dir);
        let first_event = match last_known {
            Some(value) => BrightnessEvent::Changed(value),
            None => BrightnessEvent::Unavailable {
                message: "backlight device not available on listen".into(),
            },
        };
        let _ = sink.send(first_event);

        let stop = Arc::new(AtomicBool::new(false));
        let poll_thread = thread::spawn({
            let config = self.config.clone();
            let stop = stop.clone();
            move || poll_loop(config, stop, sink, last_known)
        });

        info!(
            "brightness subscriber attached, polling every {:?}",
            self.config.poll_interval
        );
        *subscription = Some(Subscription { stop, poll_thread });
        Ok(())
    }

    /// Detach the subscriber and stop polling.
    ///
    /// Joins the poll thread before returning: once `cancel` returns, the
    /// sink will not be sent to again. The lock is held across the join so
    /// a concurrent `listen` cannot start until teardown is complete.
    pub fn cancel(&self) -> Result<(), SubscribeError> {
        let mut subscription = self.subscription.lock();
        let sub = subscription.take().ok_or(SubscribeError::NotListening)?;
        sub.stop.store(true, Ordering::SeqCst);
        if sub.poll_thread.join().is_err() {
            warn!("brightness poll thread panicked");
        }
        info!("brightness subscriber detached");
        Ok(())
    }
}

impl Drop for BrightnessMonitor {
    fn drop(&mut self) {
        // Implicit cancel: the poll thread must not outlive the monitor.
        if let Some(sub) = self.subscription.get_mut().take() {
            sub.stop.store(true, Ordering::SeqCst);
            let _ = sub.poll_thread.join();
        }
    }
}

fn sample(backlight_dir: &Path) -> Option<f64> {
    let device = sysfs::locate_device(backlight_dir)?;
    sysfs::read_brightness_fraction(&device)
}

fn poll_loop(
    config: MonitorConfig,
    stop: Arc<AtomicBool>,
    sink: UnboundedSender<BrightnessEvent>,
    mut last_known: Option<f64>,
) {
    loop {
        thread::sleep(config.poll_interval);
        // Re-check after every sleep so a cancellation that landed while
        // sleeping never triggers one more sample.
        if stop.load(Ordering::SeqCst) {
            break;
        }

        let event = match (sample(&config.backlight_dir), last_known) {
            // Movement below the epsilon is read noise, not a change.
            (Some(value), Some(previous))
                if (value - previous).abs() <= config.change_epsilon => None,
            (Some(value), _) => {
                last_known = Some(value);
                Some(BrightnessEvent::Changed(value))
            }
            // First unavailable sample after a valid reading: report once,
            // then stay quiet until the device returns.
            (None, Some(_)) => {
                last_known = None;
                Some(BrightnessEvent::Unavailable {
                    message: "backlight device became unavailable".into(),
                })
            }
            (None, None) => None,
        };

        let Some(event) = event else { continue };
        if stop.load(Ordering::SeqCst) {
            break;
        }
        match &event {
            BrightnessEvent::Changed(value) => debug!("brightness changed to {value:.4}"),
            BrightnessEvent::Unavailable { .. } => warn!("backlight device became unavailable"),
        }
        if sink.send(event).is_err() {
            debug!("brightness sink closed, stopping poll loop");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const POLL: Duration = Duration::from_millis(25);
    const WAIT: Duration = Duration::from_millis(1500);

    fn fake_root(current: &str, max: &str) -> TempDir {
        let root = TempDir::new().unwrap();
        write_device(&root, current, max);
        root
    }

    fn write_device(root: &TempDir, current: &str, max: &str) {
        let device = root.path().join("acpi_video0");
        fs::create_dir_all(&device).unwrap();
        fs::write(device.join("brightness"), current).unwrap();
        fs::write(device.join("max_brightness"), max).unwrap();
    }

    // Rename keeps the update atomic: the poll thread must never observe a
    // half-truncated attribute file.
    fn set_value(root: &TempDir, current: &str) {
        let device = root.path().join("acpi_video0");
        let tmp = device.join("brightness.tmp");
        fs::write(&tmp, current).unwrap();
        fs::rename(&tmp, device.join("brightness")).unwrap();
    }

    fn remove_device(root: &TempDir) {
        fs::remove_dir_all(root.path().join("acpi_video0")).unwrap();
    }

    fn monitor_for(root: &TempDir) -> BrightnessMonitor {
        BrightnessMonitor::new(MonitorConfig {
            backlight_dir: root.path().to_path_buf(),
            poll_interval: POLL,
            change_epsilon: DEFAULT_CHANGE_EPSILON,
        })
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<BrightnessEvent>) -> BrightnessEvent {
        timeout(WAIT, rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("sink closed unexpectedly")
    }

    #[tokio::test]
    async fn test_first_event_delivered_before_listen_returns() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        // Queued synchronously — no poll interval has elapsed yet.
        assert_eq!(rx.try_recv().unwrap(), BrightnessEvent::Changed(0.5));
        monitor.cancel().unwrap();
    }

    #[tokio::test]
    async fn test_first_event_unavailable_without_device() {
        let root = TempDir::new().unwrap();
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            BrightnessEvent::Unavailable { .. }
        ));
        monitor.cancel().unwrap();
    }

    #[tokio::test]
    async fn test_second_listener_rejected_first_unaffected() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        assert_eq!(next_event(&mut rx).await, BrightnessEvent::Changed(0.5));

        let (tx2, mut rx2) = mpsc::unbounded_channel();
        assert_eq!(monitor.listen(tx2), Err(SubscribeError::AlreadyListening));
        assert!(rx2.try_recv().is_err());
        assert!(monitor.is_listening());

        // The original subscription still polls.
        set_value(&root, "80");
        assert_eq!(next_event(&mut rx).await, BrightnessEvent::Changed(0.8));
        monitor.cancel().unwrap();
    }

    #[tokio::test]
    async fn test_change_emitted_noise_suppressed() {
        let root = fake_root("50000", "100000");
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        assert_eq!(next_event(&mut rx).await, BrightnessEvent::Changed(0.5));

        // A move of 1e-5 is within the epsilon: no event.
        set_value(&root, "50001");
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());

        // A real change is reported once.
        set_value(&root, "60000");
        assert_eq!(next_event(&mut rx).await, BrightnessEvent::Changed(0.6));
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
        monitor.cancel().unwrap();
    }

    #[tokio::test]
    async fn test_loss_reported_once_recovery_always_reported() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        assert_eq!(next_event(&mut rx).await, BrightnessEvent::Changed(0.5));

        remove_device(&root);
        assert!(matches!(
            next_event(&mut rx).await,
            BrightnessEvent::Unavailable { .. }
        ));
        // Staying unavailable is silent — no error flood.
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());

        // Recovery at the pre-loss value is still reported: last-known was
        // reset on loss.
        write_device(&root, "50", "100");
        assert_eq!(next_event(&mut rx).await, BrightnessEvent::Changed(0.5));
        monitor.cancel().unwrap();
    }

    #[tokio::test]
    async fn test_cancel_joins_and_closes_sink() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        monitor.cancel().unwrap();
        assert!(!monitor.is_listening());
        // The initial event was queued before cancel; after it the channel
        // is closed because the joined poll thread held the only sender.
        assert_eq!(rx.recv().await, Some(BrightnessEvent::Changed(0.5)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancel_without_listen() {
        let root = TempDir::new().unwrap();
        let monitor = monitor_for(&root);
        assert_eq!(monitor.cancel(), Err(SubscribeError::NotListening));
    }

    #[tokio::test]
    async fn test_relisten_after_cancel() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, _rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        monitor.cancel().unwrap();

        let (tx2, mut rx2) = mpsc::unbounded_channel();
        monitor.listen(tx2).unwrap();
        assert_eq!(rx2.try_recv().unwrap(), BrightnessEvent::Changed(0.5));
        monitor.cancel().unwrap();
    }

    #[tokio::test]
    async fn test_drop_while_listening_is_clean() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, mut rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        drop(monitor);
        // Sender died with the joined poll thread: stream ends cleanly.
        assert_eq!(rx.recv().await, Some(BrightnessEvent::Changed(0.5)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_poll_loop() {
        let root = fake_root("50", "100");
        let monitor = monitor_for(&root);
        let (tx, rx) = mpsc::unbounded_channel();
        monitor.listen(tx).unwrap();
        drop(rx);
        // Provoke a send; the loop notices the closed sink and exits, after
        // which cancel's join returns promptly.
        set_value(&root, "80");
        tokio::time::sleep(POLL * 4).await;
        monitor.cancel().unwrap();
    }
}
