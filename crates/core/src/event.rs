use crate::{error::PowerError, reading::Reading};

/// All messages that flow into the dashboard control loop.
///
/// Sources:
/// - Terminal event stream → `Quit`, `ClearHistory`, `Resize`
/// - Acquisition ticker    → `Tick`
/// - Acquisition task      → `ReadCompleted`
#[derive(Debug)]
pub enum Message {
    // ── Acquisition ───────────────────────────────────────────────────────────
    /// Interval elapsed: start a new read.
    Tick,
    /// A read finished.  `generation` is the history generation the read was
    /// issued under; stale generations are discarded.
    ReadCompleted {
        generation: u64,
        result:     Result<Reading, PowerError>,
    },

    // ── User actions ──────────────────────────────────────────────────────────
    /// `c` pressed: drop all history.
    ClearHistory,
    /// Terminal resized to `(columns, rows)`.
    Resize(u16, u16),
    /// `q` / `Esc` / `Ctrl-C`.
    Quit,
}
