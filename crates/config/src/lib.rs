pub mod schema;

pub use schema::{GraphConfig, MonitorConfig, PowermonConfig, ThemeConfig};

use powermon_core::{PowerError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `PowermonConfig::default()`
/// if the file doesn't exist so the dashboard always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<PowermonConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(PowermonConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| PowerError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration from a TOML string.  Missing keys take defaults.
pub fn parse(raw: &str) -> Result<PowermonConfig> {
    toml::from_str(raw).map_err(|e| PowerError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
        .join("powermon")
        .join("powermon.toml")
}

/// Return the default log file path, honouring `$XDG_STATE_HOME`.
pub fn default_log_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state")
        .join("powermon")
        .join("powermon.log")
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(fallback)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.monitor.interval_ms, 1_000);
    }

    #[test]
    fn loads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[monitor]\ninterval_ms = 250").unwrap();

        let cfg = load(file.path()).unwrap();
        assert_eq!(cfg.monitor.interval_ms, 250);
        assert_eq!(cfg.monitor.history_secs, 120);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = parse("[monitor\ninterval_ms = ").unwrap_err();
        assert!(matches!(err, PowerError::Config(_)));
    }

    #[test]
    fn default_path_ends_with_file_name() {
        assert!(default_path().ends_with("powermon/powermon.toml"));
        assert!(default_log_path().ends_with("powermon/powermon.log"));
    }
}
