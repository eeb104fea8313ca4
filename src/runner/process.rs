//! Process launching.

use std::process::ExitStatus;
use std::process::Stdio;

use crate::command::Command;
use crate::runner::RunError;

/// Raw result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit status. Signal terminations are reported as `128 + signal`.
    pub status: i32,
    /// Everything the child wrote to stderr.
    pub stderr: Vec<u8>,
}

/// Trait for launching commands. Abstracted for testing.
pub trait ProcessRunner: Send + Sync {
    fn run(
        &self,
        command: &Command,
    ) -> impl std::future::Future<Output = Result<ProcessExit, RunError>> + Send;
}

/// Runs commands via `tokio::process::Command`.
///
/// Stdout is discarded and stdin is closed; stderr is drained fully into
/// memory while the child runs.
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &Command) -> Result<ProcessExit, RunError> {
        let child = tokio::process::Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: command.program().to_string(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| RunError::Wait {
                program: command.program().to_string(),
                source,
            })?;

        Ok(ProcessExit {
            status: exit_code(output.status),
            stderr: output.stderr,
        })
    }
}

/// Numeric status the way a POSIX shell reports it in `$?`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        Command::from_tokens(["sh", "-c", script])
    }

    #[tokio::test]
    async fn captures_status_and_stderr() {
        let exit = TokioProcessRunner
            .run(&sh("echo out; printf boom >&2; exit 3"))
            .await
            .unwrap();
        assert_eq!(exit.status, 3);
        assert_eq!(exit.stderr, b"boom");
    }

    #[tokio::test]
    async fn stdout_is_not_captured() {
        let exit = TokioProcessRunner.run(&sh("echo hello")).await.unwrap();
        assert_eq!(exit.status, 0);
        assert!(exit.stderr.is_empty());
    }

    #[tokio::test]
    async fn sigpipe_maps_to_141() {
        let exit = TokioProcessRunner.run(&sh("kill -PIPE $$")).await.unwrap();
        assert_eq!(exit.status, 141);
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let cmd = Command::from_tokens(["vspace-test-no-such-binary", "install"]);
        let err = TokioProcessRunner.run(&cmd).await.unwrap_err();
        match err {
            RunError::Spawn { program, source } => {
                assert_eq!(program, "vspace-test-no-such-binary");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }
}
