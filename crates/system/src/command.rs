//! Subprocess helpers shared by the command-driven monitors.

use powermon_core::{PowerError, Result};
use std::io::Read;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

const PROBE_POLL: Duration = Duration::from_millis(10);

/// `true` if `program` resolves to a file on `$PATH` (`.exe` tried on Windows).
pub fn command_exists(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(program);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}

/// Run `program` and return its stdout.
///
/// The child is killed if the returned future is dropped, so wrapping this
/// in a deadline never leaks processes.  A non-zero exit is an error.
pub async fn run(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PowerError::command(program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            ""  => output.status.to_string(),
            msg => format!("{}: {msg}", output.status),
        };
        return Err(PowerError::command(program, reason));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Blocking variant of [`run`] for one-off capability probes at startup.
///
/// A child still running after `timeout` is killed and the probe yields
/// `None`, same as a failed exit.
pub fn run_blocking(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = std::process::Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    // Drain on a side thread so a full pipe cannot stall the child.
    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() < timeout => std::thread::sleep(PROBE_POLL),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program, ?timeout, "probe did not finish, killed");
                return None;
            }
        }
    };

    let stdout = reader.join().ok()?.ok()?;
    status
        .success()
        .then(|| String::from_utf8_lossy(&stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_echo() {
        let out = run("echo", &["hello"]).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn run_nonexistent() {
        let err = run("definitely_not_a_real_command_xyz", &[]).await.unwrap_err();
        assert!(matches!(err, PowerError::Command { .. }));
    }

    #[tokio::test]
    async fn run_failing_status() {
        let err = run("false", &[]).await.unwrap_err();
        assert!(matches!(err, PowerError::Command { ref program, .. } if program == "false"));
    }

    const PROBE: Duration = Duration::from_secs(5);

    #[test]
    fn run_blocking_echo() {
        assert_eq!(run_blocking("echo", &["hi"], PROBE).as_deref().map(str::trim), Some("hi"));
        assert_eq!(run_blocking("false", &[], PROBE), None);
        assert_eq!(run_blocking("definitely_not_a_real_command_xyz", &[], PROBE), None);
    }

    #[test]
    fn run_blocking_kills_hung_child() {
        let started = Instant::now();
        assert_eq!(run_blocking("sleep", &["30"], Duration::from_millis(50)), None);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn command_exists_checks_path() {
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely_not_a_real_command_xyz"));
    }
}
