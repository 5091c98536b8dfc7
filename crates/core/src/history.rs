use crate::reading::Reading;
use chrono::TimeDelta;
use std::collections::VecDeque;
use std::time::Duration;

/// Slope magnitude (watts per sample step) below which the trend is "stable".
pub const TREND_THRESHOLD_WATTS: f64 = 0.5;

/// Bounded, time-windowed history of readings with derived statistics.
///
/// Pruning is anchored to the timestamp of the reading being added, not to
/// the wall clock, so a paused or slow producer never empties the buffer.
#[derive(Debug, Clone)]
pub struct History {
    entries:  VecDeque<Reading>,
    capacity: usize,
    window:   TimeDelta,
}

impl History {
    /// A capacity of zero is treated as one.  Storage grows on demand, so a
    /// huge capacity costs nothing until readings arrive.
    pub fn new(capacity: usize, window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::new(),
            capacity,
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Prune entries outside the window of `reading`, append it, then evict
    /// from the front until the capacity bound holds.
    pub fn add(&mut self, reading: Reading) {
        // An unrepresentable cutoff means nothing can be old enough to drop.
        if let Some(cutoff) = reading.timestamp.checked_sub_signed(self.window) {
            // Entries are timestamp-ordered: stop at the first one still inside.
            while self
                .entries
                .front()
                .is_some_and(|r| r.timestamp <= cutoff)
            {
                self.entries.pop_front();
            }
        }

        self.entries.push_back(reading);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Independent copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate the live entries without copying.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn window(&self) -> Duration {
        self.window.to_std().unwrap_or(Duration::MAX)
    }

    /// Mean watts, `0.0` when empty.
    pub fn average(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(|r| r.watts).sum::<f64>() / self.entries.len() as f64
    }

    /// Lowest watts, `0.0` when empty.
    pub fn min(&self) -> f64 {
        self.entries
            .iter()
            .map(|r| r.watts)
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Highest watts, `0.0` when empty.
    pub fn max(&self) -> f64 {
        self.entries
            .iter()
            .map(|r| r.watts)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Least-squares slope of watts against sample index (`0..n`).
    ///
    /// Positive means rising consumption.  Returns `0.0` with fewer than two
    /// entries.  The x-axis is the ordinal position, not elapsed time, so
    /// irregular polling skews the magnitude but never the sign.
    pub fn trend(&self) -> f64 {
        let n = self.entries.len();
        if n < 2 {
            return 0.0;
        }

        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
        for (i, r) in self.entries.iter().enumerate() {
            let x = i as f64;
            sum_x  += x;
            sum_y  += r.watts;
            sum_xy += x * r.watts;
            sum_x2 += x * x;
        }

        let nf = n as f64;
        let denominator = nf * sum_x2 - sum_x * sum_x;
        if denominator == 0.0 {
            return 0.0;
        }

        (nf * sum_xy - sum_x * sum_y) / denominator
    }

    /// Time between the oldest and newest entry.
    pub fn span(&self) -> Duration {
        match (self.entries.front(), self.entries.back()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp)
                .to_std()
                .unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }

    /// Drop every entry; capacity and window are unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Direction of consumption derived from [`History::trend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Classify a slope using [`TREND_THRESHOLD_WATTS`].
    pub fn classify(slope: f64) -> Self {
        if slope > TREND_THRESHOLD_WATTS {
            Self::Rising
        } else if slope < -TREND_THRESHOLD_WATTS {
            Self::Falling
        } else {
            Self::Stable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local};

    fn at(base: DateTime<Local>, secs: i64, watts: f64) -> Reading {
        Reading::at(base + TimeDelta::seconds(secs), "test").with_watts(watts)
    }

    fn filled(values: &[f64]) -> History {
        let base = Local::now();
        let mut h = History::new(100, Duration::from_secs(300));
        for (i, &w) in values.iter().enumerate() {
            h.add(at(base, i as i64, w));
        }
        h
    }

    #[test]
    fn new_history_is_empty() {
        let h = History::new(100, Duration::from_secs(300));
        assert_eq!(h.len(), 0);
        assert!(h.is_empty());
        assert_eq!(h.capacity(), 100);
        assert_eq!(h.window(), Duration::from_secs(300));
        assert!(h.latest().is_none());
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut h = History::new(usize::MAX, Duration::from_secs(1));
        assert_eq!(h.capacity(), usize::MAX);
        h.add(Reading::new("test").with_watts(3.0));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn zero_capacity_is_coerced_to_one() {
        let mut h = History::new(0, Duration::from_secs(60));
        let base = Local::now();
        h.add(at(base, 0, 1.0));
        h.add(at(base, 1, 2.0));
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.len(), 1);
        assert_eq!(h.latest().map(|r| r.watts), Some(2.0));
    }

    #[test]
    fn add_keeps_insertion_order() {
        let h = filled(&[10.0, 20.0, 30.0]);
        let snap = h.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].watts, 10.0);
        assert_eq!(snap[2].watts, 30.0);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let base = Local::now();
        let mut h = History::new(3, Duration::from_secs(300));
        for i in 0..5 {
            h.add(at(base, i, (i * 10) as f64));
            assert!(h.len() <= 3);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.snapshot()[0].watts, 20.0);
    }

    #[test]
    fn window_prunes_relative_to_newest() {
        let base = Local::now();
        let mut h = History::new(100, Duration::from_secs(2));
        h.add(at(base, 0, 10.0));
        h.add(at(base, 1, 20.0));
        h.add(at(base, 4, 30.0));

        assert_eq!(h.len(), 1);
        assert_eq!(h.snapshot()[0].watts, 30.0);
    }

    #[test]
    fn entry_exactly_window_old_is_pruned() {
        let base = Local::now();
        let mut h = History::new(100, Duration::from_secs(2));
        h.add(at(base, 0, 10.0));
        h.add(at(base, 2, 20.0));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn retained_entries_stay_within_window() {
        let base = Local::now();
        let window = Duration::from_secs(5);
        let mut h = History::new(8, window);
        // Irregular, strictly increasing timestamps.
        let mut t = 0;
        for step in [1, 3, 1, 1, 4, 2, 7, 1, 1, 1, 2, 6, 1] {
            t += step;
            h.add(at(base, t, t as f64));
            let latest = h.latest().map(|r| r.timestamp).unwrap_or(base);
            assert!(h.len() <= h.capacity());
            for r in h.iter() {
                assert!((latest - r.timestamp).to_std().unwrap_or_default() <= window);
            }
        }
    }

    #[test]
    fn snapshot_is_independent() {
        let mut h = filled(&[10.0]);
        let mut snap = h.snapshot();
        snap[0].watts = 999.0;
        assert_eq!(h.snapshot()[0].watts, 10.0);

        h.clear();
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn statistics() {
        let h = filled(&[10.0, 20.0, 30.0]);
        assert_eq!(h.average(), 20.0);
        assert_eq!(h.min(), 10.0);
        assert_eq!(h.max(), 30.0);

        let h = filled(&[20.0, 5.0, 50.0, 30.0]);
        assert_eq!(h.min(), 5.0);
        assert_eq!(h.max(), 50.0);

        let h = filled(&[25.5]);
        assert_eq!(h.average(), 25.5);
    }

    #[test]
    fn statistics_on_empty_are_zero() {
        let h = History::new(10, Duration::from_secs(10));
        assert_eq!(h.average(), 0.0);
        assert_eq!(h.min(), 0.0);
        assert_eq!(h.max(), 0.0);
        assert_eq!(h.trend(), 0.0);
        assert_eq!(h.span(), Duration::ZERO);
    }

    #[test]
    fn trend_direction() {
        assert!(filled(&[10.0, 20.0, 30.0, 40.0]).trend() > 0.0);
        assert!(filled(&[40.0, 30.0, 20.0, 10.0]).trend() < 0.0);
        assert_eq!(filled(&[15.0, 15.0, 15.0, 15.0]).trend(), 0.0);
        assert_eq!(filled(&[42.0]).trend(), 0.0);
    }

    #[test]
    fn trend_is_exact_for_a_line() {
        let slope = filled(&[1.0, 3.0, 5.0, 7.0, 9.0]).trend();
        assert!((slope - 2.0).abs() < 1e-9);
    }

    #[test]
    fn clear_matches_fresh_buffer() {
        let mut h = filled(&[10.0, 20.0, 30.0]);
        h.clear();
        let fresh = History::new(100, Duration::from_secs(300));

        assert_eq!(h.len(), fresh.len());
        assert_eq!(h.average(), fresh.average());
        assert_eq!(h.min(), fresh.min());
        assert_eq!(h.max(), fresh.max());
        assert_eq!(h.trend(), fresh.trend());
        assert!(h.latest().is_none());
        assert_eq!(h.capacity(), 100);
    }

    #[test]
    fn span_covers_oldest_to_newest() {
        let h = filled(&[1.0, 2.0, 3.0]);
        assert_eq!(h.span(), Duration::from_secs(2));
    }

    #[test]
    fn trend_classification() {
        assert_eq!(Trend::classify(0.6), Trend::Rising);
        assert_eq!(Trend::classify(-0.6), Trend::Falling);
        assert_eq!(Trend::classify(0.5), Trend::Stable);
        assert_eq!(Trend::classify(-0.2), Trend::Stable);
    }
}
