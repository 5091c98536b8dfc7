use crate::format::format_duration;
use powermon_core::History;
use powermon_theme::Theme;
use ratatui::text::{Line, Span};

/// Eighth-height blocks, lowest first.
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Fraction of the observed range added above and below the data.
const PADDING: f64 = 0.1;

/// Smallest vertical range, so a flat line does not fill the whole graph.
const MIN_RANGE_WATTS: f64 = 1.0;

/// Bar graph of the history's watts, oldest on the left.
///
/// Renders as a header line with the scaled range, `height` rows of bars
/// and a time axis showing how far back the oldest sample is.
#[derive(Debug, Clone, Copy)]
pub struct GraphWidget {
    width:  u16,
    height: u16,
}

impl GraphWidget {
    /// Zero dimensions are bumped to one cell.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width:  width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn view(&self, history: &History, theme: &Theme) -> Vec<Line<'static>> {
        let axis = theme.fg(theme.axis);

        if history.is_empty() {
            return vec![Line::from(Span::styled("Waiting for data...", axis))];
        }

        let (lo, hi) = graph_bounds(history.min(), history.max());
        let watts: Vec<f64> = history.iter().map(|r| r.watts).collect();
        let points = sample_points(&watts, usize::from(self.width));

        let mut lines = Vec::with_capacity(usize::from(self.height) + 2);
        lines.push(Line::from(Span::styled(
            format!("Power ({lo:.1} - {hi:.1} W)"),
            axis,
        )));

        let bars = theme.fg(theme.accent);
        lines.extend(
            bar_rows(&points, lo, hi, self.height)
                .into_iter()
                .map(|row| Line::from(Span::styled(row, bars))),
        );

        lines.push(Line::from(Span::styled(
            format!("← {} ago", format_duration(history.span())),
            axis,
        )));
        lines
    }
}

/// Vertical range for the graph: observed `[min, max]` padded by
/// [`PADDING`] of the range on each side, the range floored at one watt and
/// the lower bound floored at zero.
pub fn graph_bounds(min: f64, max: f64) -> (f64, f64) {
    let range = (max - min).max(MIN_RANGE_WATTS);
    let lo = (min - range * PADDING).max(0.0);
    let hi = max + range * PADDING;
    (lo, hi)
}

/// Down-sample `values` to at most `width` evenly spaced points, always
/// keeping the first and last.  Shorter inputs are returned whole.
pub fn sample_points(values: &[f64], width: usize) -> Vec<f64> {
    let n = values.len();
    if width == 0 || n == 0 {
        return Vec::new();
    }
    if n <= width {
        return values.to_vec();
    }
    if width == 1 {
        return vec![values[n - 1]];
    }
    (0..width).map(|i| values[i * (n - 1) / (width - 1)]).collect()
}

/// Render `points` as `height` text rows, top row first.
///
/// Each column gets `height × 8` levels.  Every sample fills at least the
/// lowest eighth so the baseline stays visible.
fn bar_rows(points: &[f64], lo: f64, hi: f64, height: u16) -> Vec<String> {
    let height = usize::from(height.max(1));
    let span = (hi - lo).max(f64::EPSILON);
    let max_level = height * BLOCKS.len();

    let levels: Vec<usize> = points
        .iter()
        .map(|&w| {
            let norm = ((w - lo) / span).clamp(0.0, 1.0);
            (norm * (max_level - 1) as f64) as usize + 1
        })
        .collect();

    (0..height)
        .rev()
        .map(|row| {
            let floor = row * BLOCKS.len();
            levels
                .iter()
                .map(|&level| match level.saturating_sub(floor) {
                    0 => ' ',
                    fill => BLOCKS[fill.min(BLOCKS.len()) - 1],
                })
                .collect()
        })
        .collect()
}
