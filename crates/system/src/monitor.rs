use futures::future::BoxFuture;
use powermon_core::{PowerError, Reading, Result};
use std::future::Future;
use std::time::Duration;

/// A platform-specific strategy that produces [`Reading`]s from raw host
/// telemetry.
///
/// Implementations detect their sub-mode once at construction and must be
/// safe to call from several tasks at once.
pub trait Monitor: Send + Sync + std::fmt::Debug {
    /// Stable identifier for the active variant / sub-mode, e.g. `"linux-sysfs"`.
    fn name(&self) -> &str;

    /// `true` if the prerequisite tool or path exists on this host.  Says
    /// nothing about whether a read will report non-zero watts.
    fn is_supported(&self) -> bool;

    /// Perform one acquisition, giving up with [`PowerError::Timeout`] once
    /// `deadline` has elapsed.
    ///
    /// Unavailable sub-readings are reported through the sentinels on
    /// [`Reading`]; an error means no usable signal was obtained at all.
    fn read(&self, deadline: Duration) -> BoxFuture<'_, Result<Reading>>;

    /// `true` when running with elevated privileges would unlock power data.
    fn needs_sudo(&self) -> bool {
        false
    }
}

/// Run `fut` under `deadline`.  On expiry the future is dropped, which kills
/// any child process it spawned.
pub async fn with_deadline<T>(
    deadline: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| PowerError::Timeout(deadline))?
}
