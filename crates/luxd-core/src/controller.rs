// luxd — local backlight control over sysfs

//! Synchronous brightness operations over the sysfs device.
//!
//! Every call re-resolves the backlight device from the filesystem instead
//! of holding a cached handle: the controller stays a pure function of the
//! device root, which keeps it testable against a fake root and means a
//! device that disappears or re-enumerates between calls is picked up (or
//! reported unavailable) on the next call.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::BrightnessError;
use crate::sysfs;

/// Default delay between the two writes of the zero-value workaround.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(130);

/// Synchronous get/set/probe operations on the first backlight device.
#[derive(Debug, Clone)]
pub struct BrightnessController {
    backlight_dir: PathBuf,
    settle_delay: Duration,
}

impl BrightnessController {
    pub fn new(backlight_dir: impl Into<PathBuf>) -> Self {
        Self {
            backlight_dir: backlight_dir.into(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the settle delay of the zero-value workaround.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Current brightness as a fraction of the device maximum.
    pub fn brightness(&self) -> Result<f64, BrightnessError> {
        let device = self.device()?;
        sysfs::read_brightness_fraction(&device).ok_or_else(|| {
            BrightnessError::Unavailable(
                "failed to read valid brightness values from device".into(),
            )
        })
    }

    /// Set brightness to `target`, a fraction of the device maximum.
    ///
    /// Out-of-range targets are clamped to the device range rather than
    /// rejected; only non-finite values are refused. Setting exactly zero
    /// writes the value twice with a settle delay in between: some backlight
    /// drivers silently drop a single write of 0 landing right after a
    /// non-zero value, and the second write is the one that sticks.
    pub fn set_brightness(&self, target: f64) -> Result<(), BrightnessError> {
        if !target.is_finite() {
            return Err(BrightnessError::InvalidArgument(format!(
                "brightness must be a finite number, got {target}"
            )));
        }
        let device = self.device()?;
        let max = sysfs::read_attr_int(&device.join(sysfs::MAX_BRIGHTNESS_ATTR))
            .filter(|max| *max > 0)
            .ok_or_else(|| {
                BrightnessError::Unavailable(
                    "failed to read valid max_brightness from device".into(),
                )
            })?;

        let desired = ((target * max as f64).round() as i64).clamp(0, max);
        let attr = device.join(sysfs::BRIGHTNESS_ATTR);
        debug!("setting brightness to {}/{}", desired, max);

        sysfs::write_attr_int(&attr, desired)
            .map_err(|e| BrightnessError::Io(format!("write of {desired} failed: {e}")))?;

        if desired == 0 {
            // Ordering matters: first write, settle, second write.
            thread::sleep(self.settle_delay);
            sysfs::write_attr_int(&attr, 0).map_err(|e| {
                BrightnessError::Io(format!("corrective second write of 0 failed: {e}"))
            })?;
        }
        Ok(())
    }

    /// Whether the brightness attribute is writable for this process.
    ///
    /// A permission probe only — the stored value is never touched.
    pub fn can_set_brightness(&self) -> bool {
        match sysfs::locate_device(&self.backlight_dir) {
            Some(device) => sysfs::attr_writable(&device.join(sysfs::BRIGHTNESS_ATTR)),
            None => false,
        }
    }

    /// Whether a backlight device is currently present at all.
    pub fn device_present(&self) -> bool {
        sysfs::locate_device(&self.backlight_dir).is_some()
    }

    fn device(&self) -> Result<PathBuf, BrightnessError> {
        sysfs::locate_device(&self.backlight_dir)
            .ok_or_else(|| BrightnessError::Unavailable("no backlight device found".into()))
    }
}
