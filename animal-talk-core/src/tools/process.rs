// animal-talk-core/src/tools/process.rs

//! Bounded child-process execution with captured output.

use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Represents the outcome of one supervised child process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    /// Exit code, or -1 when the process was killed or ended by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Set when the process was killed after exceeding its timeout. Output is
    /// empty in that case.
    pub timed_out: bool,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// Spawns `command`, waits up to `timeout` for it to exit and for both
/// output streams to close, and returns what it printed.
///
/// The timeout covers the drain too: a background process holding the
/// inherited pipes open counts as still running. On timeout the readers are
/// dropped and the child is killed and reaped before returning. Spawn and
/// wait failures are returned as `Err`.
pub async fn run_with_timeout(mut command: Command, timeout: Duration) -> std::io::Result<ProcessResult> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(command = ?command, timeout_secs = timeout.as_secs_f64(), "Spawning child process");
    let mut child = command.spawn()?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let finished = tokio::time::timeout(timeout, async {
        let (status, stdout, stderr) =
            tokio::join!(child.wait(), read_stream(stdout_pipe), read_stream(stderr_pipe));
        status.map(|status| (status, stdout, stderr))
    })
    .await;

    match finished {
        Ok(result) => {
            let (status, stdout, stderr) = result?;
            let exit_code = status.code().unwrap_or(-1);

            debug!(
                "Child exit status: {}\nStdout preview (first 3 lines):\n{}\nStderr preview (first 3 lines):\n{}",
                exit_code,
                stdout.lines().take(3).collect::<Vec<_>>().join("\n"),
                stderr.lines().take(3).collect::<Vec<_>>().join("\n")
            );

            Ok(ProcessResult {
                exit_code,
                stdout,
                stderr,
                timed_out: false,
            })
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs_f64(), "Child process timed out, killing it");
            // kill() also waits, so the child is reaped here. It fails when the
            // child already exited and only its pipes were still open.
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill timed-out child process");
            }
            Ok(ProcessResult {
                exit_code: -1,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
            })
        }
    }
}

async fn read_stream<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!(error = %e, "Failed to read child output stream");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let result = run_with_timeout(sh("echo out; echo err >&2"), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(result.success());
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_reports_exit_code() {
        let result = run_with_timeout(sh("exit 7"), Duration::from_secs(5)).await.unwrap();
        assert_eq!(result.exit_code, 7);
        assert!(!result.timed_out);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let start = Instant::now();
        let result = run_with_timeout(sh("exec sleep 30"), Duration::from_millis(300))
            .await
            .unwrap();
        assert!(result.timed_out);
        assert!(result.stdout.is_empty());
        assert!(start.elapsed() < Duration::from_secs(5), "Timed-out call took {:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_background_process_holding_pipes_times_out() {
        let start = Instant::now();
        let result = run_with_timeout(sh("sleep 20 &\necho started"), Duration::from_millis(500))
            .await
            .unwrap();
        assert!(result.timed_out);
        assert!(result.stdout.is_empty());
        assert!(start.elapsed() < Duration::from_secs(5), "Timed-out call took {:?}", start.elapsed());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_err() {
        let cmd = Command::new("this_program_should_not_exist_qwertyuiop");
        let result = run_with_timeout(cmd, Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}
