use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One canonical, fully-normalised power / battery measurement.
///
/// Built by an acquisition variant with [`Reading::new`] and the `with_*`
/// methods, then handed out by value and never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Power draw in watts.  Always `>= 0`; direction lives in
    /// `is_on_battery` / `is_charging`.
    pub watts: f64,
    /// When the sample was taken.
    pub timestamp: DateTime<Local>,
    /// `true` when the primary power source is the battery.
    pub is_on_battery: bool,
    /// Charge level in `[0, 100]`, or [`Reading::PERCENT_UNKNOWN`].
    pub battery_percent: f64,
    pub is_charging: bool,
    /// Identifier of the variant that produced this reading, e.g. `"linux-sysfs"`.
    pub source: String,
}

impl Reading {
    /// Sentinel for "battery percentage not available".
    pub const PERCENT_UNKNOWN: f64 = -1.0;

    /// A reading stamped "now" with every numeric field at its unknown value.
    pub fn new(source: impl Into<String>) -> Self {
        Self::at(Local::now(), source)
    }

    /// Same as [`Reading::new`] but with an explicit timestamp.
    pub fn at(timestamp: DateTime<Local>, source: impl Into<String>) -> Self {
        Self {
            watts: 0.0,
            timestamp,
            is_on_battery: false,
            battery_percent: Self::PERCENT_UNKNOWN,
            is_charging: false,
            source: source.into(),
        }
    }

    /// Set the power draw.  Negative or non-finite inputs are folded to a
    /// valid magnitude so the `watts >= 0` invariant always holds.
    #[must_use]
    pub fn with_watts(mut self, watts: f64) -> Self {
        self.watts = if watts.is_finite() { watts.abs() } else { 0.0 };
        self
    }

    /// Set the charge level.  Values above 100 are clamped (energy ratios can
    /// overshoot on worn cells); negative or non-finite values become unknown.
    #[must_use]
    pub fn with_battery_percent(mut self, percent: f64) -> Self {
        self.battery_percent = if percent.is_finite() && percent >= 0.0 {
            percent.min(100.0)
        } else {
            Self::PERCENT_UNKNOWN
        };
        self
    }

    #[must_use]
    pub fn with_on_battery(mut self, on_battery: bool) -> Self {
        self.is_on_battery = on_battery;
        self
    }

    #[must_use]
    pub fn with_charging(mut self, charging: bool) -> Self {
        self.is_charging = charging;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Charge level, `None` when the platform did not report one.
    #[must_use]
    pub fn battery_percent(&self) -> Option<f64> {
        (self.battery_percent >= 0.0).then_some(self.battery_percent)
    }
}
