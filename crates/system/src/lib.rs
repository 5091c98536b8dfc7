pub mod command;
pub mod darwin;
pub mod dispatch;
pub mod mock;
pub mod monitor;
pub mod normalize;
pub mod sysfs;
pub mod wmi;

pub use dispatch::{detect, UnsupportedMonitor};
pub use mock::MockMonitor;
pub use monitor::{with_deadline, Monitor};

use powermon_core::{Reading, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

/// Spawn a background Tokio task that reads `monitor` every `interval` and
/// forwards each outcome through the returned channel.
///
/// Reads are serialized: a slow read delays the next tick instead of
/// overlapping it.  Failed reads are forwarded too, so the consumer decides
/// what a transient error means.  The task stops when the receiver is dropped.
pub fn spawn_monitor(
    monitor: Arc<dyn Monitor>,
    interval: Duration,
    deadline: Duration,
) -> mpsc::Receiver<Result<Reading>> {
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let result = monitor.read(deadline).await;

            if let Err(e) = &result {
                tracing::debug!(monitor = monitor.name(), "read failed: {e}");
            }

            if tx.send(result).await.is_err() {
                break; // receiver dropped
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use powermon_core::PowerError;

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn streams_readings_in_order() {
        let mock = Arc::new(MockMonitor::new().with_auto_increment(1.0));
        let mut rx = spawn_monitor(mock.clone(), Duration::from_millis(5), DEADLINE);

        for expected in [1.0, 2.0, 3.0] {
            let r = rx.recv().await.unwrap().unwrap();
            assert_eq!(r.watts, expected);
        }
        assert!(mock.read_count() >= 3);
    }

    #[tokio::test]
    async fn errors_are_forwarded() {
        let mock = Arc::new(MockMonitor::new().with_error("no data"));
        let mut rx = spawn_monitor(mock, Duration::from_millis(5), DEADLINE);
        let err = rx.recv().await.unwrap().unwrap_err();
        assert!(matches!(err, PowerError::Command { .. }));
    }

    #[tokio::test]
    async fn timeouts_are_forwarded() {
        let mock = Arc::new(MockMonitor::new().with_delay(Duration::from_secs(10)));
        let mut rx = spawn_monitor(mock, Duration::from_millis(5), Duration::from_millis(20));
        let err = rx.recv().await.unwrap().unwrap_err();
        assert!(matches!(err, PowerError::Timeout(_)));
    }

    #[tokio::test]
    async fn stops_when_receiver_dropped() {
        let mock = Arc::new(MockMonitor::new());
        let rx = spawn_monitor(mock.clone(), Duration::from_millis(1), DEADLINE);
        drop(rx);

        time::sleep(Duration::from_millis(50)).await;
        let settled = mock.read_count();
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mock.read_count(), settled);
    }
}
