use crate::monitor::Monitor;
use futures::future::BoxFuture;
use powermon_core::{PowerError, Reading, Result};
use std::sync::Arc;
use std::time::Duration;

/// Pick the acquisition variant for the host platform.
///
/// Sub-mode probing (battery presence, privileges, supply paths) happens
/// here, once; the returned monitor never re-detects.
pub fn detect() -> Arc<dyn Monitor> {
    let monitor = platform_monitor();
    tracing::info!(
        monitor = monitor.name(),
        supported = monitor.is_supported(),
        "selected power monitor"
    );
    monitor
}

#[cfg(target_os = "linux")]
fn platform_monitor() -> Arc<dyn Monitor> {
    Arc::new(crate::sysfs::SysfsMonitor::new())
}

#[cfg(target_os = "macos")]
fn platform_monitor() -> Arc<dyn Monitor> {
    Arc::new(crate::darwin::DarwinMonitor::new())
}

#[cfg(target_os = "windows")]
fn platform_monitor() -> Arc<dyn Monitor> {
    Arc::new(crate::wmi::WmiMonitor::new())
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn platform_monitor() -> Arc<dyn Monitor> {
    Arc::new(UnsupportedMonitor::new(std::env::consts::OS))
}

/// Stand-in for hosts with no acquisition variant.  Never supported; every
/// read fails with [`PowerError::Unsupported`].
#[derive(Debug, Clone)]
pub struct UnsupportedMonitor {
    name: String,
}

impl UnsupportedMonitor {
    pub fn new(os: &str) -> Self {
        Self { name: format!("{os}-unsupported") }
    }
}

impl Monitor for UnsupportedMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn read(&self, _deadline: Duration) -> BoxFuture<'_, Result<Reading>> {
        Box::pin(async move {
            Err(PowerError::Unsupported(format!(
                "no power source available ({})",
                self.name
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_stable() {
        let a = detect();
        let b = detect();
        assert_eq!(a.name(), b.name());
        assert!(!a.name().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_uses_sysfs() {
        assert_eq!(detect().name(), "linux-sysfs");
    }

    #[tokio::test]
    async fn unsupported_monitor_always_fails() {
        let m = UnsupportedMonitor::new("plan9");
        assert_eq!(m.name(), "plan9-unsupported");
        assert!(!m.is_supported());
        let err = m.read(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, PowerError::Unsupported(_)));
        assert!(!err.is_transient());
    }
}
