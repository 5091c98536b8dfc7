use crate::battery::BatteryWidget;
use crate::format::format_watts;
use powermon_core::{History, Reading, Trend};
use powermon_theme::Theme;
use ratatui::text::{Line, Span};

/// Current draw, trend arrow and (when known) the battery indicator.
#[derive(Debug, Default)]
pub struct PowerWidget {
    battery: BatteryWidget,
}

impl PowerWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// `latest` is the last successful reading; `None` shows `0.0 W`.
    pub fn view(&self, latest: Option<&Reading>, history: &History, theme: &Theme) -> Line<'static> {
        let watts = latest.map_or(0.0, |r| r.watts);

        let mut spans = vec![
            Span::styled(format_watts(watts), theme.bold(theme.power)),
            Span::raw("  "),
            trend_span(Trend::classify(history.trend()), theme),
        ];

        if let Some(battery) = latest.and_then(|r| self.battery.view(r, theme)) {
            spans.push(Span::raw("  "));
            spans.extend(battery);
        }

        Line::from(spans)
    }
}

fn trend_span(trend: Trend, theme: &Theme) -> Span<'static> {
    match trend {
        Trend::Rising  => Span::styled("▲ increasing", theme.bold(theme.rising)),
        Trend::Falling => Span::styled("▼ decreasing", theme.bold(theme.falling)),
        Trend::Stable  => Span::styled("● stable", theme.fg(theme.stable)),
    }
}
