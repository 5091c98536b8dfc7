//! Windows monitor built on WMI queries run through PowerShell.
//!
//! Both scripts print `Key=Value` lines so the parsing stays independent of
//! PowerShell's object formatting.

use crate::command::{command_exists, run};
use crate::monitor::{with_deadline, Monitor};
use crate::normalize::milliwatts;
use futures::future::BoxFuture;
use powermon_core::{Reading, Result};
use std::collections::HashMap;
use std::time::Duration;

const SOURCE: &str = "windows-wmi";

const BATTERY_SCRIPT: &str = r#"
$battery = Get-WmiObject Win32_Battery
if ($battery) {
    Write-Output "BatteryStatus=$($battery.BatteryStatus)"
    Write-Output "EstimatedChargeRemaining=$($battery.EstimatedChargeRemaining)"
    Write-Output "DesignCapacity=$($battery.DesignCapacity)"
    Write-Output "FullChargeCapacity=$($battery.FullChargeCapacity)"
}
$power = Get-WmiObject Win32_PowerMeter -ErrorAction SilentlyContinue
if ($power) {
    Write-Output "CurrentReading=$($power.CurrentReading)"
}
"#;

const DISCHARGE_SCRIPT: &str = r#"
$battery = Get-WmiObject -Class BatteryStatus -Namespace root\wmi -ErrorAction SilentlyContinue
if ($battery) {
    Write-Output "DischargeRate=$($battery.DischargeRate)"
    Write-Output "Voltage=$($battery.Voltage)"
}
"#;

/// `Win32_Battery.BatteryStatus` reported while discharging.
const STATUS_DISCHARGING: u32 = 1;
/// `Win32_Battery.BatteryStatus` codes treated as charging: fully charged,
/// low and critical on AC (3..=5) plus the explicit charging states (6..=9).
/// Undefined (10) and partially charged (11) are not.
const STATUS_CHARGING: std::ops::RangeInclusive<u32> = 3..=9;

#[derive(Debug, Clone, Default)]
pub struct WmiMonitor;

impl WmiMonitor {
    pub fn new() -> Self {
        Self
    }

    async fn powershell(script: &str) -> Result<String> {
        run("powershell", &["-NoProfile", "-NonInteractive", "-Command", script]).await
    }
}

impl Monitor for WmiMonitor {
    fn name(&self) -> &str {
        SOURCE
    }

    fn is_supported(&self) -> bool {
        command_exists("powershell")
    }

    fn read(&self, deadline: Duration) -> BoxFuture<'_, Result<Reading>> {
        Box::pin(with_deadline(deadline, async move {
            let (battery, discharge) = tokio::join!(
                Self::powershell(BATTERY_SCRIPT),
                Self::powershell(DISCHARGE_SCRIPT),
            );

            let battery = match battery {
                Ok(out) => Some(parse_battery(&out)),
                Err(e) => {
                    tracing::warn!("Win32_Battery query failed: {e}");
                    None
                }
            };
            let discharge_rate = match discharge {
                Ok(out) => parse_discharge_rate(&out),
                Err(e) if battery.is_some() => {
                    tracing::debug!("BatteryStatus query failed: {e}");
                    None
                }
                // Neither query produced anything usable.
                Err(e) => return Err(e),
            };

            let battery = battery.unwrap_or_default();
            Ok(battery.apply(Reading::new(SOURCE), discharge_rate))
        }))
    }
}

/// Fields of interest from the `Win32_Battery` / `Win32_PowerMeter` script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmiBattery {
    pub status:          Option<u32>,
    pub percent:         Option<f64>,
    /// `Win32_PowerMeter.CurrentReading`, milliwatts.
    pub power_meter_mw:  Option<f64>,
}

impl WmiBattery {
    pub fn is_on_battery(&self) -> bool {
        self.status == Some(STATUS_DISCHARGING)
    }

    pub fn is_charging(&self) -> bool {
        self.status.is_some_and(|s| STATUS_CHARGING.contains(&s))
    }

    /// Power meter if positive, else discharge rate (mW) if positive, else 0.
    pub fn watts(&self, discharge_rate_mw: Option<f64>) -> f64 {
        self.power_meter_mw
            .or(discharge_rate_mw)
            .map_or(0.0, milliwatts)
    }

    fn apply(&self, reading: Reading, discharge_rate_mw: Option<f64>) -> Reading {
        let reading = reading
            .with_on_battery(self.is_on_battery())
            .with_charging(self.is_charging())
            .with_watts(self.watts(discharge_rate_mw));
        match self.percent {
            Some(pct) => reading.with_battery_percent(pct),
            None      => reading,
        }
    }
}

/// Split `Key=Value` lines; blank and malformed lines are skipped.
fn key_values(output: &str) -> HashMap<&str, &str> {
    output
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

pub fn parse_battery(output: &str) -> WmiBattery {
    let fields = key_values(output);
    WmiBattery {
        status: fields.get("BatteryStatus").and_then(|v| v.parse().ok()),
        percent: fields
            .get("EstimatedChargeRemaining")
            .and_then(|v| v.parse().ok()),
        power_meter_mw: fields
            .get("CurrentReading")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|&mw| mw > 0.0),
    }
}

/// `BatteryStatus.DischargeRate` in milliwatts, when positive.
pub fn parse_discharge_rate(output: &str) -> Option<f64> {
    key_values(output)
        .get("DischargeRate")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|&mw| mw > 0.0)
}
