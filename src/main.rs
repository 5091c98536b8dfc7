//! powermon: live power draw and battery trends in the terminal.
//!
//! Run with:  `RUST_LOG=debug powermon`  (dashboard logs go to the state dir)

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use powermon_config::{default_log_path, default_path, load as load_config, PowermonConfig};
use powermon_core::Reading;
use powermon_system::{detect, spawn_monitor, MockMonitor, Monitor};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "powermon", version, about = "Live power consumption monitor")]
#[command(group(ArgGroup::new("headless").args(["once", "stream"])))]
struct Cli {
    /// Time between readings, in milliseconds.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// How far back the history and graph reach, in seconds.
    #[arg(long, value_name = "SECS")]
    history_secs: Option<u64>,

    /// Config file (default: $XDG_CONFIG_HOME/powermon/powermon.toml).
    #[arg(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Take one reading, print it and exit.
    #[arg(long, conflicts_with = "stream")]
    once: bool,

    /// Print a reading every interval instead of drawing the dashboard.
    #[arg(long)]
    stream: bool,

    /// Print readings as JSON (with --once or --stream).
    #[arg(long, requires = "headless")]
    json: bool,

    /// Use a simulated monitor with steadily rising draw.
    #[arg(long)]
    mock: bool,
}

impl Cli {
    fn dashboard(&self) -> bool {
        !self.once && !self.stream
    }

    fn apply_overrides(&self, config: &mut PowermonConfig) {
        if let Some(ms) = self.interval_ms {
            config.monitor.interval_ms = ms;
        }
        if let Some(secs) = self.history_secs {
            config.monitor.history_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.dashboard());

    let mut config = load_config(cli.config.clone().unwrap_or_else(default_path))?;
    cli.apply_overrides(&mut config);

    tracing::info!("powermon v{} starting", env!("CARGO_PKG_VERSION"));

    let monitor: Arc<dyn Monitor> = if cli.mock {
        Arc::new(MockMonitor::new().with_auto_increment(10.0))
    } else {
        detect()
    };

    if !monitor.is_supported() {
        eprintln!("Error: Power monitoring is not supported on this system.");
        eprintln!("Monitor: {}", monitor.name());
        std::process::exit(1);
    }

    if cli.once {
        let reading = monitor
            .read(config.monitor.read_timeout())
            .await
            .with_context(|| format!("reading from {}", monitor.name()))?;
        print_reading(&reading, cli.json)?;
        return Ok(());
    }

    if cli.stream {
        let mut rx = spawn_monitor(
            monitor,
            config.monitor.interval(),
            config.monitor.read_timeout(),
        );
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(Ok(reading)) => print_reading(&reading, cli.json)?,
                    Some(Err(e)) => eprintln!("read failed: {e}"),
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        return Ok(());
    }

    powermon_tui::run(monitor, &config).await?;
    Ok(())
}

/// Structured logging; `RUST_LOG` controls verbosity (default: info).
///
/// The dashboard owns the screen, so it logs to a file instead of stderr.
fn init_logging(to_file: bool) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        // Without a log file, stay silent rather than scribble on the UI.
        if let Ok(file) = open_log_file() {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .init();
}

fn open_log_file() -> std::io::Result<std::fs::File> {
    let path = default_log_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::File::create(path)
}

fn print_reading(reading: &Reading, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(reading)?);
        return Ok(());
    }

    let battery = match reading.battery_percent() {
        Some(pct) if reading.is_charging   => format!("  battery {pct:.0}% (charging)"),
        Some(pct) if reading.is_on_battery => format!("  battery {pct:.0}% (discharging)"),
        Some(pct)                          => format!("  battery {pct:.0}%"),
        None                               => String::new(),
    };
    let source = if reading.is_on_battery { "Battery" } else { "AC Power" };

    println!(
        "{:.1} W  {source}{battery}  [{}]",
        reading.watts, reading.source
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::try_parse_from(["powermon", "--interval-ms", "250", "--history-secs", "30"])
            .unwrap();
        let mut config = PowermonConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.monitor.interval_ms, 250);
        assert_eq!(config.monitor.history_secs, 30);
        assert!(cli.dashboard());
    }

    #[test]
    fn once_and_stream_conflict() {
        assert!(Cli::try_parse_from(["powermon", "--once", "--stream"]).is_err());
        let cli = Cli::try_parse_from(["powermon", "--once", "--json"]).unwrap();
        assert!(!cli.dashboard());
    }

    #[test]
    fn json_needs_a_headless_mode() {
        assert!(Cli::try_parse_from(["powermon", "--json"]).is_err());
        assert!(Cli::try_parse_from(["powermon", "--stream", "--json"]).is_ok());
    }
}
