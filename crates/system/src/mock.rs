//! Scriptable in-memory monitor for tests and `--mock` runs.

use crate::monitor::{with_deadline, Monitor};
use futures::future::BoxFuture;
use powermon_core::{PowerError, Reading, Result};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const DEFAULT_NAME: &str = "mock";
const DEFAULT_WATTS: f64 = 10.0;
const DEFAULT_PERCENT: f64 = 75.0;

#[derive(Debug, Default)]
struct State {
    read_count: usize,
    next:       usize,
    error:      Option<String>,
}

/// A [`Monitor`] that replays a fixed script.
///
/// With no script it generates charging readings at `base` watts, optionally
/// rising by one watt per read.  Scripted watts-only sequences are stamped at
/// read time; full [`Reading`]s are returned as given.
#[derive(Debug)]
pub struct MockMonitor {
    name:           String,
    supported:      bool,
    script:         Script,
    base_watts:     f64,
    auto_increment: bool,
    delay:          Option<Duration>,
    state:          Mutex<State>,
}

#[derive(Debug, Clone)]
enum Script {
    Generated,
    Watts(Vec<f64>),
    Readings(Vec<Reading>),
}

impl Default for MockMonitor {
    fn default() -> Self {
        Self {
            name:           DEFAULT_NAME.to_string(),
            supported:      true,
            script:         Script::Generated,
            base_watts:     DEFAULT_WATTS,
            auto_increment: false,
            delay:          None,
            state:          Mutex::new(State::default()),
        }
    }
}

impl MockMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_supported(mut self, supported: bool) -> Self {
        self.supported = supported;
        self
    }

    /// Cycle through `readings` in order, timestamps untouched.
    #[must_use]
    pub fn with_readings(mut self, readings: Vec<Reading>) -> Self {
        self.script = if readings.is_empty() {
            Script::Generated
        } else {
            Script::Readings(readings)
        };
        self
    }

    /// Cycle through `watts`, each reading stamped when it is produced.
    #[must_use]
    pub fn with_watts(mut self, watts: &[f64]) -> Self {
        self.script = if watts.is_empty() {
            Script::Generated
        } else {
            Script::Watts(watts.to_vec())
        };
        self
    }

    /// Every read fails with a command error carrying `message` until
    /// [`reset`](Self::reset).
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .error = Some(message.into());
        self
    }

    /// Generated readings start at `base` and rise one watt per read.
    #[must_use]
    pub fn with_auto_increment(mut self, base: f64) -> Self {
        self.auto_increment = true;
        self.base_watts = base;
        self
    }

    /// Sleep before answering; used to exercise read deadlines.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of reads started so far, including failed ones.
    pub fn read_count(&self) -> usize {
        self.state().read_count
    }

    /// Rewind the script, zero the read counter and clear any error.
    pub fn reset(&self) {
        *self.state() = State::default();
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reading(&self) -> Result<Reading> {
        let mut state = self.state();
        state.read_count += 1;

        if let Some(message) = &state.error {
            return Err(PowerError::command(&self.name, message));
        }

        let reading = match &self.script {
            Script::Readings(readings) => {
                let r = readings[state.next % readings.len()].clone();
                state.next = (state.next + 1) % readings.len();
                r
            }
            Script::Watts(watts) => {
                let w = watts[state.next % watts.len()];
                state.next = (state.next + 1) % watts.len();
                self.generated(w)
            }
            Script::Generated => {
                let step = if self.auto_increment {
                    (state.read_count - 1) as f64
                } else {
                    0.0
                };
                self.generated(self.base_watts + step)
            }
        };

        Ok(reading)
    }

    fn generated(&self, watts: f64) -> Reading {
        Reading::new(&self.name)
            .with_watts(watts)
            .with_battery_percent(DEFAULT_PERCENT)
            .with_charging(true)
    }
}

impl Monitor for MockMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn read(&self, deadline: Duration) -> BoxFuture<'_, Result<Reading>> {
        Box::pin(with_deadline(deadline, async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.next_reading()
        }))
    }
}
