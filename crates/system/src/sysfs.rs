use crate::monitor::{with_deadline, Monitor};
use crate::normalize::{microamp_microvolts, microwatts, prefer_direct};
use futures::future::BoxFuture;
use powermon_core::{PowerError, Reading, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the kernel exposes power supplies.
pub const POWER_SUPPLY_PATH: &str = "/sys/class/power_supply";

const SOURCE: &str = "linux-sysfs";

/// Reads battery and adapter state from the Linux sysfs power-supply tree.
///
/// The first supply whose `type` is `Battery` and the first whose type is
/// `Mains`, `USB` or `USB_PD` are picked once at construction.
#[derive(Debug, Clone)]
pub struct SysfsMonitor {
    root:    PathBuf,
    battery: Option<PathBuf>,
    adapter: Option<PathBuf>,
}

impl SysfsMonitor {
    pub fn new() -> Self {
        Self::with_root(POWER_SUPPLY_PATH)
    }

    /// Probe an alternative power-supply directory (used by tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let (battery, adapter) = detect_supplies(&root);

        match (&battery, &adapter) {
            (None, None) => tracing::debug!("no power supplies found under {}", root.display()),
            _ => tracing::debug!(?battery, ?adapter, "detected power supplies"),
        }

        Self { root, battery, adapter }
    }

    pub fn battery_path(&self) -> Option<&Path> {
        self.battery.as_deref()
    }

    pub fn adapter_path(&self) -> Option<&Path> {
        self.adapter.as_deref()
    }

    /// One synchronous pass over the detected supplies.
    fn sample(&self) -> Reading {
        let mut reading = Reading::new(SOURCE);

        if let Some(adapter) = &self.adapter {
            reading = reading.with_on_battery(read_attr(adapter, "online").as_deref() != Some("1"));
        }

        if let Some(battery) = &self.battery {
            if let Some(percent) = battery_percent(battery) {
                reading = reading.with_battery_percent(percent);
            }

            let status = read_attr(battery, "status").unwrap_or_default();
            reading = reading
                .with_charging(status.eq_ignore_ascii_case("charging"))
                .with_watts(battery_watts(battery));

            // No adapter entry to ask: fall back to the battery's own view.
            if self.adapter.is_none() {
                reading = reading.with_on_battery(status.eq_ignore_ascii_case("discharging"));
            }
        }

        reading
    }
}

impl Default for SysfsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor for SysfsMonitor {
    fn name(&self) -> &str {
        SOURCE
    }

    fn is_supported(&self) -> bool {
        self.root.is_dir() && (self.battery.is_some() || self.adapter.is_some())
    }

    fn read(&self, deadline: Duration) -> BoxFuture<'_, Result<Reading>> {
        Box::pin(async move {
            if !self.is_supported() {
                return Err(PowerError::Unsupported(format!(
                    "no battery or AC adapter under {}",
                    self.root.display()
                )));
            }

            let supply = self.clone();
            with_deadline(deadline, async move {
                // sysfs reads can stall on misbehaving firmware; keep them off
                // the async workers.  A timed-out sample is simply dropped.
                tokio::task::spawn_blocking(move || supply.sample())
                    .await
                    .map_err(|e| PowerError::Io { source: std::io::Error::other(e) })
            })
            .await
        })
    }
}

fn detect_supplies(root: &Path) -> (Option<PathBuf>, Option<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return (None, None);
    };

    let mut dirs: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    dirs.sort();

    let mut battery = None;
    let mut adapter = None;
    for dir in dirs {
        match read_attr(&dir, "type").as_deref() {
            Some("Battery") if battery.is_none() => battery = Some(dir),
            Some("Mains" | "USB" | "USB_PD") if adapter.is_none() => adapter = Some(dir),
            _ => {}
        }
    }

    (battery, adapter)
}

/// Read and trim a sysfs attribute; `None` if missing or empty.
fn read_attr(dir: &Path, name: &str) -> Option<String> {
    let raw = std::fs::read_to_string(dir.join(name)).ok()?;
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn read_number(dir: &Path, name: &str) -> Option<f64> {
    read_attr(dir, name)?.parse().ok()
}

/// `capacity` if exposed, else `energy_now / energy_full`, else
/// `charge_now / charge_full`.
fn battery_percent(battery: &Path) -> Option<f64> {
    let ratio = |now: &str, full: &str| -> Option<f64> {
        let now  = read_number(battery, now)?;
        let full = read_number(battery, full)?;
        (full > 0.0).then(|| now / full * 100.0)
    };

    read_number(battery, "capacity")
        .or_else(|| ratio("energy_now", "energy_full"))
        .or_else(|| ratio("charge_now", "charge_full"))
}

/// `power_now` (µW) if exposed, else `|voltage_now × current_now|` (µV × µA).
fn battery_watts(battery: &Path) -> f64 {
    let direct = read_number(battery, "power_now").map(microwatts);
    let derived = read_number(battery, "voltage_now")
        .zip(read_number(battery, "current_now"))
        .map(|(uv, ua)| microamp_microvolts(ua, uv));

    prefer_direct(direct, derived)
}
