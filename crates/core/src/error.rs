use std::time::Duration;
use thiserror::Error;

/// Top-level error type used across the entire application.
///
/// Partial or malformed telemetry is never an error; variants report it
/// through sentinel values on [`Reading`](crate::Reading) instead.
#[derive(Debug, Error)]
pub enum PowerError {
    /// No acquisition prerequisite (tool or path) exists on this host.
    #[error("power monitoring unsupported: {0}")]
    Unsupported(String),

    /// An external command could not be spawned or exited non-zero.
    #[error("command `{program}` failed: {reason}")]
    Command { program: String, reason: String },

    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    #[error("config error: {0}")]
    Config(String),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PowerError {
    /// Shorthand for [`PowerError::Command`].
    pub fn command(program: impl Into<String>, reason: impl ToString) -> Self {
        Self::Command {
            program: program.into(),
            reason:  reason.to_string(),
        }
    }

    /// `true` for failures that only affect the current tick.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Command { .. } | Self::Timeout(_) | Self::Io { .. })
    }
}

pub type Result<T, E = PowerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_message() {
        let err = PowerError::command("pmset", "exit status 1");
        assert_eq!(err.to_string(), "command `pmset` failed: exit status 1");
    }

    #[test]
    fn transient_classification() {
        assert!(PowerError::Timeout(Duration::from_secs(5)).is_transient());
        assert!(PowerError::command("ioreg", "boom").is_transient());
        assert!(!PowerError::Unsupported("no sysfs".into()).is_transient());
        assert!(!PowerError::Config("bad".into()).is_transient());
    }
}
