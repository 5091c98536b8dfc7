use powermon_config::PowermonConfig;
use powermon_core::{History, Message, PowerError, Reading};
use powermon_system::Monitor;
use powermon_theme::Theme;
use powermon_widgets::GraphWidget;
use tracing::{debug, warn};

/// Columns reserved around the graph for borders and padding.
const GRAPH_MARGIN_COLS: u16 = 20;
/// Rows reserved for everything that is not the graph.
const GRAPH_MARGIN_ROWS: u16 = 15;

/// What the control loop must do after [`Dashboard::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Start an acquisition tagged with `generation`.
    Read { generation: u64 },
    Quit,
}

/// All dashboard state.  Only the control loop touches it, one message at a
/// time, so no locking is needed.
#[derive(Debug)]
pub struct Dashboard {
    monitor:      String,
    needs_sudo:   bool,
    theme:        Theme,
    history:      History,
    last_reading: Option<Reading>,
    last_error:   Option<PowerError>,
    /// Bumped on clear; completions from an older generation are dropped.
    generation:   u64,
    graph_limit:  (u16, u16),
    graph:        GraphWidget,
    quitting:     bool,
}

impl Dashboard {
    pub fn new(monitor: &dyn Monitor, config: &PowermonConfig) -> Self {
        let limit = (config.graph.width, config.graph.height);
        Self {
            monitor:      monitor.name().to_string(),
            needs_sudo:   monitor.needs_sudo(),
            theme:        Theme::from_config(&config.theme),
            history:      History::new(
                config.monitor.history_capacity(),
                config.monitor.history_window(),
            ),
            last_reading: None,
            last_error:   None,
            generation:   0,
            graph_limit:  limit,
            graph:        GraphWidget::new(limit.0, limit.1),
            quitting:     false,
        }
    }

    // ── Update ────────────────────────────────────────────────────────────────

    pub fn update(&mut self, message: Message) -> Effect {
        match message {
            Message::Tick => Effect::Read { generation: self.generation },
            Message::ReadCompleted { generation, result } => {
                self.apply_read(generation, result);
                Effect::None
            }
            Message::ClearHistory => {
                self.history.clear();
                self.generation += 1;
                debug!(generation = self.generation, "history cleared");
                Effect::None
            }
            Message::Resize(cols, rows) => {
                self.resize(cols, rows);
                Effect::None
            }
            Message::Quit => {
                self.quitting = true;
                Effect::Quit
            }
        }
    }

    fn apply_read(&mut self, generation: u64, result: Result<Reading, PowerError>) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale read");
            return;
        }

        match result {
            Ok(reading) => {
                debug!(watts = reading.watts, source = %reading.source, "reading");
                self.last_error = None;
                self.history.add(reading.clone());
                self.last_reading = Some(reading);
            }
            Err(e) => {
                warn!("read failed: {e}");
                self.last_error = Some(e);
            }
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let (max_w, max_h) = self.graph_limit;
        let width  = max_w.min(cols.saturating_sub(GRAPH_MARGIN_COLS));
        let height = max_h.min(rows.saturating_sub(GRAPH_MARGIN_ROWS));
        self.graph = GraphWidget::new(width, height);
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn monitor(&self) -> &str {
        &self.monitor
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn last_reading(&self) -> Option<&Reading> {
        self.last_reading.as_ref()
    }

    pub fn last_error(&self) -> Option<&PowerError> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn graph(&self) -> GraphWidget {
        self.graph
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Show the privilege hint while the monitor can only report zero watts.
    pub fn show_sudo_hint(&self) -> bool {
        self.needs_sudo && self.last_reading.as_ref().map_or(0.0, |r| r.watts) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powermon_system::MockMonitor;
    use std::time::Duration;

    const DEADLINE: Duration = Duration::from_secs(5);

    fn dashboard() -> Dashboard {
        Dashboard::new(&MockMonitor::new(), &PowermonConfig::default())
    }

    fn ok(generation: u64, watts: f64) -> Message {
        Message::ReadCompleted {
            generation,
            result: Ok(Reading::new("mock").with_watts(watts)),
        }
    }

    #[test]
    fn tick_requests_read_for_current_generation() {
        let mut d = dashboard();
        assert_eq!(d.update(Message::Tick), Effect::Read { generation: 0 });
        d.update(Message::ClearHistory);
        assert_eq!(d.update(Message::Tick), Effect::Read { generation: 1 });
    }

    #[test]
    fn successful_read_updates_history() {
        let mut d = dashboard();
        assert_eq!(d.update(ok(0, 12.5)), Effect::None);
        assert_eq!(d.history().len(), 1);
        assert_eq!(d.last_reading().map(|r| r.watts), Some(12.5));
        assert!(d.last_error().is_none());
    }

    #[test]
    fn failed_read_keeps_history_and_sets_error() {
        let mut d = dashboard();
        d.update(ok(0, 10.0));
        d.update(Message::ReadCompleted {
            generation: 0,
            result:     Err(PowerError::Timeout(DEADLINE)),
        });

        assert_eq!(d.history().len(), 1);
        assert!(matches!(d.last_error(), Some(PowerError::Timeout(_))));
        assert_eq!(d.last_reading().map(|r| r.watts), Some(10.0));

        // The next success clears the indicator.
        d.update(ok(0, 11.0));
        assert!(d.last_error().is_none());
    }

    #[test]
    fn clear_discards_in_flight_reads() {
        let mut d = dashboard();
        d.update(ok(0, 10.0));
        let Effect::Read { generation: stale } = d.update(Message::Tick) else {
            panic!("tick should start a read");
        };

        d.update(Message::ClearHistory);
        assert!(d.history().is_empty());

        d.update(ok(stale, 99.0));
        assert!(d.history().is_empty());

        d.update(ok(d.generation(), 5.0));
        assert_eq!(d.history().len(), 1);
    }

    #[test]
    fn out_of_order_completions_are_all_applied() {
        let mut d = dashboard();
        d.update(ok(0, 3.0));
        d.update(ok(0, 1.0));
        d.update(ok(0, 2.0));
        assert_eq!(d.history().len(), 3);
        assert_eq!(d.last_reading().map(|r| r.watts), Some(2.0));
    }

    #[test]
    fn resize_shrinks_graph_within_configured_limit() {
        let mut d = dashboard();
        d.update(Message::Resize(200, 100));
        assert_eq!((d.graph().width(), d.graph().height()), (60, 12));

        d.update(Message::Resize(50, 20));
        assert_eq!((d.graph().width(), d.graph().height()), (30, 5));

        d.update(Message::Resize(10, 10));
        assert_eq!((d.graph().width(), d.graph().height()), (1, 1));
    }

    #[test]
    fn quit() {
        let mut d = dashboard();
        assert_eq!(d.update(Message::Quit), Effect::Quit);
        assert!(d.is_quitting());
    }

    #[test]
    fn sudo_hint_only_for_zero_watts() {
        let monitor = MockMonitor::new();
        let mut d = Dashboard::new(&monitor, &PowermonConfig::default());
        d.needs_sudo = true;
        assert!(d.show_sudo_hint());
        d.update(ok(0, 4.0));
        assert!(!d.show_sudo_hint());
        assert_eq!(d.monitor(), "mock");
    }

    #[tokio::test]
    async fn mock_readings_drive_trend() {
        let monitor = MockMonitor::new().with_auto_increment(10.0);
        let mut d = Dashboard::new(&monitor, &PowermonConfig::default());

        for _ in 0..5 {
            let Effect::Read { generation } = d.update(Message::Tick) else {
                panic!("tick should start a read");
            };
            let result = monitor.read(DEADLINE).await;
            d.update(Message::ReadCompleted { generation, result });
        }

        assert_eq!(d.history().len(), 5);
        assert!((d.history().trend() - 1.0).abs() < 1e-9);
        assert_eq!(d.history().max(), 14.0);
    }
}
