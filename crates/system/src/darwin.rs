//! macOS monitor built on `pmset`, `ioreg` and `powermetrics`.
//!
//! Laptops report everything through the `AppleSmartBattery` registry entry.
//! Desktops have no battery; their only power source is `powermetrics`,
//! which needs root.

use crate::command::{command_exists, run, run_blocking};
use crate::monitor::{with_deadline, Monitor};
use crate::normalize::{milliamp_millivolts, milliwatts, parse_signed};
use futures::future::BoxFuture;
use powermon_core::{Reading, Result};
use std::time::Duration;

/// Upper bound on the startup `ioreg` probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Typical MacBook pack voltage, used when only a current figure is known.
const ESTIMATED_PACK_VOLTS: f64 = 11.4;

const IOREG_ARGS: &[&str] = &["-rn", "AppleSmartBattery"];
const PMSET_ARGS: &[&str] = &["-g", "batt"];
const POWERMETRICS_ARGS: &[&str] = &["-n", "1", "-i", "100", "--samplers", "cpu_power", "-f", "text"];

/// Which acquisition path was chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DarwinMode {
    /// Laptop: `pmset` + `ioreg` battery telemetry.
    Battery,
    /// Desktop running as root: `powermetrics`.
    Powermetrics,
    /// Desktop without root: source and charge only, no watts.
    Desktop,
}

#[derive(Debug, Clone)]
pub struct DarwinMonitor {
    mode:     DarwinMode,
    has_root: bool,
}

impl DarwinMonitor {
    /// Probe for a battery and root privileges.  Runs `ioreg` once; a probe
    /// that hangs counts as "no battery".
    pub fn new() -> Self {
        let has_battery = run_blocking("ioreg", IOREG_ARGS, PROBE_TIMEOUT)
            .is_some_and(|out| out.contains("AppleSmartBattery"));
        let monitor = Self::with_capabilities(has_battery, effective_uid_is_root());
        tracing::info!(mode = ?monitor.mode, "macOS power capabilities detected");
        monitor
    }

    /// Build a monitor for known capabilities without probing the host.
    pub fn with_capabilities(has_battery: bool, has_root: bool) -> Self {
        let mode = match (has_battery, has_root) {
            (true, _)      => DarwinMode::Battery,
            (false, true)  => DarwinMode::Powermetrics,
            (false, false) => DarwinMode::Desktop,
        };
        Self { mode, has_root }
    }

    pub fn mode(&self) -> DarwinMode {
        self.mode
    }

    async fn read_powermetrics(&self) -> Result<Reading> {
        let reading = Reading::new(self.name());
        match run("powermetrics", POWERMETRICS_ARGS).await {
            Ok(out) => Ok(reading.with_watts(powermetrics_watts(&out))),
            Err(e) => {
                // Keep the tick alive with a zero-watt reading.
                tracing::warn!("powermetrics failed: {e}");
                Ok(reading)
            }
        }
    }

    async fn read_battery(&self) -> Result<Reading> {
        let pmset = run("pmset", PMSET_ARGS).await?;
        let reading = parse_pmset(&pmset).apply(Reading::new(self.name()));

        if self.mode != DarwinMode::Battery {
            return Ok(reading);
        }

        match run("ioreg", IOREG_ARGS).await {
            Ok(ioreg) => Ok(reading.with_watts(ioreg_watts(&ioreg))),
            Err(e) => {
                tracing::warn!("ioreg failed: {e}");
                Ok(reading)
            }
        }
    }
}

impl Default for DarwinMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor for DarwinMonitor {
    fn name(&self) -> &str {
        match self.mode {
            DarwinMode::Powermetrics => "macOS-powermetrics",
            DarwinMode::Desktop      => "macOS-desktop",
            DarwinMode::Battery      => "macOS-battery",
        }
    }

    fn is_supported(&self) -> bool {
        command_exists("pmset")
    }

    fn read(&self, deadline: Duration) -> BoxFuture<'_, Result<Reading>> {
        Box::pin(with_deadline(deadline, async move {
            match self.mode {
                DarwinMode::Powermetrics => self.read_powermetrics().await,
                DarwinMode::Battery | DarwinMode::Desktop => self.read_battery().await,
            }
        }))
    }

    fn needs_sudo(&self) -> bool {
        self.mode == DarwinMode::Desktop && !self.has_root
    }
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn effective_uid_is_root() -> bool {
    false
}

// ── pmset ─────────────────────────────────────────────────────────────────────

/// Battery state extracted from `pmset -g batt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PmsetStatus {
    pub on_battery: bool,
    pub percent:    Option<f64>,
    pub charging:   bool,
}

impl PmsetStatus {
    fn apply(&self, reading: Reading) -> Reading {
        let reading = reading
            .with_on_battery(self.on_battery)
            .with_charging(self.charging);
        match self.percent {
            Some(pct) => reading.with_battery_percent(pct),
            None      => reading,
        }
    }
}

/// Parse `pmset -g batt` output.
///
/// ```text
/// Now drawing from 'Battery Power'
///  -InternalBattery-0 (id=4653155)	75%; discharging; 3:12 remaining present: true
/// ```
pub fn parse_pmset(output: &str) -> PmsetStatus {
    let mut status = PmsetStatus::default();

    if let Some(first) = output.lines().next() {
        status.on_battery = first.to_lowercase().contains("battery power");
    }

    for line in output.lines() {
        if !line.contains("InternalBattery") && !line.contains('%') {
            continue;
        }

        if let Some(pct) = percent_in(line) {
            status.percent = Some(pct);
        }

        let lower = line.to_lowercase();
        if lower.contains("discharging") || lower.contains("not charging") {
            status.charging = false;
        } else if lower.contains("charging") {
            status.charging = true;
        }
    }

    status
}

/// First `<digits>%` in `line`.
fn percent_in(line: &str) -> Option<f64> {
    line.match_indices('%').find_map(|(idx, _)| {
        let head = &line[..idx];
        let start = head
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(0, |(i, c)| i + c.len_utf8());
        head[start..].parse().ok()
    })
}

// ── ioreg ─────────────────────────────────────────────────────────────────────

/// Raw digits of the first `"key" = <digits>` in an ioreg dump.  Matches both
/// top-level properties and entries inside inline dictionaries
/// (`{"SystemLoad"=14210,...}`).
fn ioreg_field<'a>(output: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\"");
    output.match_indices(&needle).find_map(|(idx, _)| {
        let rest = output[idx + needle.len()..].trim_start();
        let rest = rest.strip_prefix('=')?.trim_start();
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    })
}

fn ioreg_signed(output: &str, key: &str) -> Option<i64> {
    parse_signed(ioreg_field(output, key)?)
}

/// A non-zero milliwatt telemetry field, as watts.
fn ioreg_milliwatts(output: &str, key: &str) -> Option<f64> {
    ioreg_signed(output, key)
        .filter(|&v| v != 0)
        .map(|v| milliwatts(v.unsigned_abs() as f64))
}

/// Best wattage available in an `ioreg -rn AppleSmartBattery` dump.
///
/// Preference: adapter input power, system load, input current × voltage,
/// battery power, instantaneous battery current × voltage, then a rough
/// estimate from battery current at a nominal pack voltage.
pub fn ioreg_watts(output: &str) -> f64 {
    telemetry_watts(output)
        .or_else(|| instant_watts(output))
        .or_else(|| estimated_watts(output))
        .unwrap_or(0.0)
}

fn telemetry_watts(output: &str) -> Option<f64> {
    ioreg_milliwatts(output, "SystemPowerIn")
        .or_else(|| ioreg_milliwatts(output, "SystemLoad"))
        .or_else(|| input_power(output))
        .or_else(|| ioreg_milliwatts(output, "BatteryPower"))
}

/// `SystemCurrentIn` (mA) × `SystemVoltageIn` (mV).
fn input_power(output: &str) -> Option<f64> {
    let current = ioreg_signed(output, "SystemCurrentIn")?;
    let voltage = ioreg_signed(output, "SystemVoltageIn")?;
    (current != 0 && voltage != 0)
        .then(|| milliamp_millivolts(current as f64, voltage as f64))
}

/// `InstantAmperage` (mA, signed) × `Voltage` (mV).
fn instant_watts(output: &str) -> Option<f64> {
    let amperage = ioreg_signed(output, "InstantAmperage").unwrap_or(0);
    let voltage = ioreg_signed(output, "Voltage").unwrap_or(0);
    (voltage > 0 && amperage != 0)
        .then(|| milliamp_millivolts(amperage as f64, voltage as f64))
}

fn estimated_watts(output: &str) -> Option<f64> {
    let design = ioreg_signed(output, "DesignCapacity").unwrap_or(0);
    let current = ioreg_signed(output, "CurrentCapacity").unwrap_or(0);
    let amperage = ioreg_signed(output, "Amperage").unwrap_or(0);
    (design > 0 && current > 0 && amperage != 0)
        .then(|| (ESTIMATED_PACK_VOLTS * amperage as f64 / 1_000.0).abs())
}

// ── powermetrics ──────────────────────────────────────────────────────────────

/// `<label>…: <number> mW` on a single line, as watts.
fn powermetrics_field(output: &str, label: &str) -> Option<f64> {
    output.lines().find_map(|line| {
        let (_, after_label) = line.split_once(label)?;
        let (_, value) = after_label.split_once(':')?;
        let value = value.trim_start();
        let end = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(end);
        if !unit.trim_start().starts_with("mW") {
            return None;
        }
        number.parse().ok().map(milliwatts)
    })
}

/// Total package power from `powermetrics --samplers cpu_power`.
///
/// A combined or package total wins; otherwise CPU, GPU and ANE are summed,
/// each counting as zero when absent.
pub fn powermetrics_watts(output: &str) -> f64 {
    if let Some(total) = powermetrics_field(output, "Combined Power")
        .or_else(|| powermetrics_field(output, "Package Power"))
    {
        return total;
    }

    ["CPU Power", "GPU Power", "ANE Power"]
        .iter()
        .filter_map(|label| powermetrics_field(output, label))
        .sum()
}
