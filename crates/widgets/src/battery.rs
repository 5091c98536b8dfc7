use powermon_core::Reading;
use powermon_theme::Theme;
use ratatui::text::Span;

/// Charge band used to pick the indicator colour and icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    High,
    Medium,
    Low,
}

impl BatteryLevel {
    /// `>= 60` high, `>= 20` medium, else low.
    pub fn classify(percent: f64) -> Self {
        if percent >= 60.0 {
            Self::High
        } else if percent >= 20.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::High | Self::Medium => "🔋",
            Self::Low                 => "🪫",
        }
    }
}

/// Battery percentage with a charge-state suffix.
///
/// Hidden entirely when the reading carries no percentage (desktops, VMs).
#[derive(Debug, Default)]
pub struct BatteryWidget;

impl BatteryWidget {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when the percentage is unknown; callers skip rendering.
    pub fn view(&self, reading: &Reading, theme: &Theme) -> Option<Vec<Span<'static>>> {
        let pct   = reading.battery_percent()?;
        let level = BatteryLevel::classify(pct);

        let color = match level {
            BatteryLevel::High   => theme.falling,
            BatteryLevel::Medium => theme.stable,
            BatteryLevel::Low    => theme.rising,
        };

        let mut spans = vec![
            Span::raw(format!("{} ", level.icon())),
            Span::styled(format!("{pct:.0}%"), theme.bold(color)),
        ];
        if let Some(state) = charge_state(reading) {
            spans.push(Span::styled(format!(" {state}"), theme.fg(theme.value)));
        }
        Some(spans)
    }
}

/// Charging wins over on-battery; neither means idle on AC.
fn charge_state(reading: &Reading) -> Option<&'static str> {
    if reading.is_charging {
        Some("⚡")
    } else if reading.is_on_battery {
        Some("↓")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn levels() {
        assert_eq!(BatteryLevel::classify(100.0), BatteryLevel::High);
        assert_eq!(BatteryLevel::classify(60.0), BatteryLevel::High);
        assert_eq!(BatteryLevel::classify(59.9), BatteryLevel::Medium);
        assert_eq!(BatteryLevel::classify(20.0), BatteryLevel::Medium);
        assert_eq!(BatteryLevel::classify(19.0), BatteryLevel::Low);
        assert_eq!(BatteryLevel::classify(0.0), BatteryLevel::Low);
    }

    #[test]
    fn hidden_without_percentage() {
        let r = Reading::new("test");
        assert!(BatteryWidget::new().view(&r, &Theme::default()).is_none());
    }

    #[test]
    fn charging_and_discharging_suffixes() {
        let theme = Theme::default();
        let w = BatteryWidget::new();

        let r = Reading::new("t").with_battery_percent(85.4).with_charging(true);
        assert_eq!(text(&w.view(&r, &theme).unwrap()), "🔋 85% ⚡");

        let r = Reading::new("t").with_battery_percent(12.0).with_on_battery(true);
        assert_eq!(text(&w.view(&r, &theme).unwrap()), "🪫 12% ↓");

        let r = Reading::new("t").with_battery_percent(100.0);
        assert_eq!(text(&w.view(&r, &theme).unwrap()), "🔋 100%");
    }

    #[test]
    fn colour_follows_level() {
        let theme = Theme::default();
        let r = Reading::new("t").with_battery_percent(10.0);
        let spans = BatteryWidget::new().view(&r, &theme).unwrap();
        assert_eq!(spans[1].style, theme.bold(theme.rising));
    }
}
