use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure parsed from `powermon.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowermonConfig {
    /// Sampling and retention settings.
    pub monitor: MonitorConfig,
    /// Graph dimensions in terminal cells.
    pub graph: GraphConfig,
    /// Theme / visual settings.
    pub theme: ThemeConfig,
}

/// Sampling and history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Time between reads in milliseconds.
    pub interval_ms: u64,
    /// How far back the history (and graph) reaches, in seconds.
    pub history_secs: u64,
    /// Hard cap on retained samples.  `0` derives it from the window.
    pub max_samples: usize,
    /// Per-read deadline in milliseconds.
    pub timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms:  1_000,
            history_secs: 120,
            max_samples:  0,
            timeout_ms:   5_000,
        }
    }
}

impl MonitorConfig {
    /// Samples kept beyond the window-derived count when `max_samples = 0`.
    const CAPACITY_HEADROOM: usize = 100;

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn history_window(&self) -> Duration {
        Duration::from_secs(self.history_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    /// Effective history capacity: `max_samples`, or enough samples to cover
    /// the window at the configured interval plus some headroom.
    pub fn history_capacity(&self) -> usize {
        if self.max_samples > 0 {
            return self.max_samples;
        }
        let per_window = self.history_window().as_secs_f64() / self.interval().as_secs_f64();
        // `as` saturates, so huge windows clamp to usize::MAX instead of wrapping.
        (per_window as usize).saturating_add(Self::CAPACITY_HEADROOM)
    }
}

/// Graph size; shrunk to fit the terminal at draw time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub width: u16,
    pub height: u16,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            width:  60,
            height: 12,
        }
    }
}

/// Theme / styling configuration.  Colours are `#RRGGBB` hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Title, border and graph bars.
    pub accent: String,
    /// Current power figure.
    pub power: String,
    /// Stat labels.
    pub label: String,
    /// Stat values.
    pub value: String,
    /// Rising trend and low battery.
    pub rising: String,
    /// Falling trend and high battery.
    pub falling: String,
    /// Stable trend and medium battery.
    pub stable: String,
    /// Graph axis and help text.
    pub axis: String,
    /// Error indicator.
    pub error: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent:  "#7D56F4".to_string(),
            power:   "#00FF00".to_string(),
            label:   "#888888".to_string(),
            value:   "#FFFFFF".to_string(),
            rising:  "#FF5555".to_string(),
            falling: "#55FF55".to_string(),
            stable:  "#FFFF55".to_string(),
            axis:    "#555555".to_string(),
            error:   "#FF5555".to_string(),
        }
    }
}
