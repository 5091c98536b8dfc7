use std::time::Duration;

/// Compact human duration: `0s`, `45s`, `2m`, `2m5s`, `1h3m`.
///
/// Sub-second spans collapse to `0s`; seconds are dropped once the span
/// reaches an hour.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => {
            let (m, s) = (secs / 60, secs % 60);
            if s > 0 {
                format!("{m}m{s}s")
            } else {
                format!("{m}m")
            }
        }
        _ => format!("{}h{}m", secs / 3600, (secs % 3600) / 60),
    }
}

/// `12.3 W` style figure used across the dashboard.
pub fn format_watts(watts: f64) -> String {
    format!("{watts:.1} W")
}
