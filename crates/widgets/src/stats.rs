use powermon_core::{History, PowerError, Reading};
use powermon_theme::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Rolling statistics plus the power-source / monitor line.
#[derive(Debug, Default)]
pub struct StatsWidget;

impl StatsWidget {
    pub fn new() -> Self {
        Self
    }

    pub fn view(
        &self,
        history: &History,
        latest: Option<&Reading>,
        monitor: &str,
        theme: &Theme,
    ) -> Vec<Line<'static>> {
        let label = theme.fg(theme.label);
        let value = theme.bold(theme.value);

        let stats = Line::from(
            [
                ("Avg", format!("{:.1}W", history.average())),
                ("Min", format!("{:.1}W", history.min())),
                ("Max", format!("{:.1}W", history.max())),
                ("Samples", history.len().to_string()),
            ]
            .into_iter()
            .enumerate()
            .flat_map(|(i, (name, v))| field(i > 0, name, v, label, value))
            .collect::<Vec<_>>(),
        );

        let on_battery = latest.is_some_and(|r| r.is_on_battery);
        let source = if on_battery { "Battery" } else { "AC Power" };

        let mut source_line = field(false, "Source", source.to_string(), label, value);
        source_line.extend(field(true, "Monitor", monitor.to_string(), label, value));

        vec![stats, Line::from(source_line)]
    }
}

fn field(
    leading_gap: bool,
    name: &'static str,
    v: String,
    label: Style,
    value: Style,
) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(3);
    if leading_gap {
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(format!("{name}: "), label));
    spans.push(Span::styled(v, value));
    spans
}

/// Visible but non-blocking marker for the last failed read.
pub fn error_line(error: &PowerError, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(format!("⚠ Error: {error}"), theme.fg(theme.error)))
}

/// Hint shown on hosts that only report power with elevated privileges.
pub fn sudo_hint(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "💡 Tip: Run with sudo for power data on this machine:",
            theme.fg(theme.label),
        )),
        Line::from(Span::styled("   sudo powermon", theme.bold(theme.value))),
    ]
}

pub fn help_line(theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        "Press 'q' to quit • 'c' to clear history",
        theme.fg(theme.axis),
    ))
}
