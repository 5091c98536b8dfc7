pub mod battery;
pub mod format;
pub mod graph;
pub mod power;
pub mod stats;

pub use battery::{BatteryLevel, BatteryWidget};
pub use format::{format_duration, format_watts};
pub use graph::{graph_bounds, sample_points, GraphWidget};
pub use power::PowerWidget;
pub use stats::{error_line, help_line, sudo_hint, StatsWidget};
