// luxd — local backlight control over sysfs

//! Sysfs backlight device discovery and attribute I/O.
//!
//! The kernel exposes each backlight as an entry (usually a symlink) under
//! `/sys/class/backlight/`, holding two integer attribute files:
//! `brightness` (read-write) and `max_brightness` (read-only).

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Default sysfs class directory for backlight devices.
pub const DEFAULT_BACKLIGHT_DIR: &str = "/sys/class/backlight";

/// Name of the read-write current-brightness attribute.
pub const BRIGHTNESS_ATTR: &str = "brightness";
/// Name of the read-only maximum-brightness attribute.
pub const MAX_BRIGHTNESS_ATTR: &str = "max_brightness";

/// Find the first backlight device under `base`.
///
/// Returns the first directory or symlink entry the enumeration yields —
/// when several devices exist, which one wins is up to readdir order, and
/// callers must not depend on a specific choice. `None` when the base
/// directory is missing, unreadable, or empty; callers treat that as "no
/// controllable device right now", not as an error.
pub fn locate_device(base: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(base).ok()?;
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() || file_type.is_symlink() {
            return Some(entry.path());
        }
    }
    None
}

/// Read a leading decimal integer from an attribute file.
///
/// Sysfs attributes are newline-terminated; anything after a successfully
/// extracted integer is ignored. `None` on open failure or when no integer
/// can be extracted at all.
pub fn read_attr_int(path: &Path) -> Option<i64> {
    let raw = fs::read_to_string(path).ok()?;
    let value = parse_leading_int(&raw);
    if value.is_none() {
        debug!("no integer in attribute {}: {:?}", path.display(), raw);
    }
    value
}

/// Write `value` to an attribute file, truncating any previous contents.
pub fn write_attr_int(path: &Path, value: i64) -> io::Result<()> {
    fs::write(path, value.to_string())
}

/// Probe whether the attribute at `path` is writable for this process.
///
/// Opens for append without writing a byte, so the stored value is never
/// disturbed.
pub fn attr_writable(path: &Path) -> bool {
    OpenOptions::new().append(true).open(path).is_ok()
}

/// Read the current brightness of `device_dir` as a fraction of its maximum.
///
/// `None` when either attribute is unreadable, `brightness` is negative, or
/// `max_brightness` is not strictly positive (a zero maximum makes the
/// fraction undefined). A reading above 1.0 is passed through untouched —
/// some drivers report `brightness > max_brightness` transiently.
pub fn read_brightness_fraction(device_dir: &Path) -> Option<f64> {
    let current = read_attr_int(&device_dir.join(BRIGHTNESS_ATTR))?;
    let max = read_attr_int(&device_dir.join(MAX_BRIGHTNESS_ATTR))?;
    if current < 0 || max <= 0 {
        return None;
    }
    Some(current as f64 / max as f64)
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    let digits = unsigned.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let end = (trimmed.len() - unsigned.len()) + digits;
    trimmed[..end].parse().ok()
}
