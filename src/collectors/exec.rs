use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("failed to read output of {program}: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Status { program: String, status: ExitStatus },
    #[error("{program} did not finish within {deadline:?}")]
    Timeout { program: String, deadline: Duration },
}

/// Runs `program` and returns its stdout, or an error once `deadline` passes.
///
/// The child is spawned with `kill_on_drop`, so abandoning the wait on timeout
/// kills it; tokio reaps it in the background.
pub async fn execute(
    program: &str,
    args: &[String],
    deadline: Duration,
) -> Result<Vec<u8>, ProbeError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProbeError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = match time::timeout(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ProbeError::Wait {
                program: program.to_string(),
                source,
            })
        }
        Err(_elapsed) => {
            return Err(ProbeError::Timeout {
                program: program.to_string(),
                deadline,
            })
        }
    };

    if !output.status.success() {
        return Err(ProbeError::Status {
            program: program.to_string(),
            status: output.status,
        });
    }

    Ok(output.stdout)
}

/// Like [`execute`], but absorbs every failure into `None`.
pub async fn run_probe(
    probe: &str,
    program: &str,
    args: &[String],
    deadline: Duration,
) -> Option<Vec<u8>> {
    let start = Instant::now();
    match execute(program, args, deadline).await {
        Ok(stdout) => {
            debug!(
                probe,
                program,
                bytes = stdout.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "probe finished"
            );
            Some(stdout)
        }
        Err(err @ ProbeError::Timeout { .. }) => {
            warn!(probe, error = %err, "probe timed out");
            None
        }
        Err(err) => {
            debug!(probe, error = %err, "probe produced no output");
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn captures_stdout() {
        let out = execute("sh", &sh("printf 'hello\\nworld\\n'"), Duration::from_secs(5))
            .await
            .expect("sh runs");
        assert_eq!(out, b"hello\nworld\n");
    }

    #[tokio::test]
    async fn stderr_is_not_captured() {
        let out = execute("sh", &sh("echo oops >&2; echo ok"), Duration::from_secs(5))
            .await
            .expect("sh runs");
        assert_eq!(out, b"ok\n");
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let err = execute("trueview-no-such-tool", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[tokio::test]
    async fn non_zero_exit_is_status_error() {
        let err = execute("sh", &sh("echo partial; exit 3"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Status { .. }));
    }

    #[tokio::test]
    async fn overrun_is_cut_at_deadline() {
        let start = Instant::now();
        let err = execute("sh", &sh("sleep 10"), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    // A child that is gone or left as a zombie no longer runs.
    #[cfg(target_os = "linux")]
    fn is_running(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.trim_start().chars().next())
                .map_or(false, |state| state != 'Z'),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timed_out_child_is_killed() {
        let pid_file = std::env::temp_dir().join(format!(
            "trueview-stats-timeout-{}.pid",
            std::process::id()
        ));
        let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());
        let err = execute("sh", &sh(&script), Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));

        let pid = std::fs::read_to_string(&pid_file).expect("pid written before timeout");
        let pid = pid.trim().to_string();
        let mut running = true;
        for _ in 0..40 {
            running = is_running(&pid);
            if !running {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let _ = std::fs::remove_file(&pid_file);
        assert!(!running, "sleep {pid} still running after timeout");
    }

    #[tokio::test]
    async fn run_probe_absorbs_failures() {
        assert!(run_probe("missing", "trueview-no-such-tool", &[], Duration::from_secs(1))
            .await
            .is_none());
        assert!(run_probe("slow", "sh", &sh("sleep 10"), Duration::from_millis(100))
            .await
            .is_none());
        assert_eq!(
            run_probe("ok", "sh", &sh("printf 42"), Duration::from_secs(5)).await,
            Some(b"42".to_vec())
        );
    }
}
