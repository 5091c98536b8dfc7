//! Dashboard rendering.
//!
//! ╭ ⚡ Power Monitor ──────────────────────────────╮
//! │  14.2 W  ▲ increasing  🔋 81% ⚡                 │
//! │                                                 │
//! │  Power (9.1 - 15.3 W)                           │
//! │  ▁▁▂▂▃▅▆▇██                                     │
//! │  ← 2m5s ago                                     │
//! │                                                 │
//! │  Avg: 12.0W  Min: 10.0W  Max: 14.2W  Samples: 9 │
//! │  Source: AC Power  Monitor: linux-sysfs         │
//! │                                                 │
//! │  Press 'q' to quit • 'c' to clear history       │
//! ╰─────────────────────────────────────────────────╯

use crate::app::Dashboard;
use powermon_widgets::{error_line, help_line, sudo_hint, PowerWidget, StatsWidget};
use ratatui::{prelude::*, widgets::*};

pub fn draw(f: &mut Frame, app: &Dashboard) {
    let theme = app.theme();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.fg(theme.accent))
        .padding(Padding::new(2, 2, 1, 1))
        .title(Span::styled(" ⚡ Power Monitor ", theme.bold(theme.accent)));

    let paragraph = Paragraph::new(body(app)).block(block);
    f.render_widget(paragraph, f.area());
}

fn body(app: &Dashboard) -> Vec<Line<'static>> {
    let theme = app.theme();
    let latest = app.last_reading();

    let mut lines = vec![
        PowerWidget::new().view(latest, app.history(), theme),
        Line::default(),
    ];

    lines.extend(app.graph().view(app.history(), theme));
    lines.push(Line::default());

    lines.extend(StatsWidget::new().view(app.history(), latest, app.monitor(), theme));

    if let Some(error) = app.last_error() {
        lines.push(Line::default());
        lines.push(error_line(error, theme));
    }

    if app.show_sudo_hint() {
        lines.push(Line::default());
        lines.extend(sudo_hint(theme));
    }

    lines.push(Line::default());
    lines.push(help_line(theme));
    lines
}
