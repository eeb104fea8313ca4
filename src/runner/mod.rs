//! Command execution and outcome classification.
//!
//! A run has two kinds of bad ending and callers must be able to tell them
//! apart: the tool could not be run at all ([`RunError`], raised), or the
//! tool ran and reported an error ([`Outcome::Failure`], returned).

pub mod process;

use miette::Diagnostic;
use thiserror::Error;

use crate::command::Command;
use crate::runner::process::ProcessRunner;

/// Exit status a process gets when killed by SIGPIPE (`128 + 13`).
///
/// A downstream reader closing the pipe early is a benign termination for
/// the tools we drive.
pub const BROKEN_PIPE_STATUS: i32 = 141;

/// Infrastructure failures: the command never produced a classifiable result.
#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    #[error("failed to launch `{program}`")]
    #[diagnostic(help("make sure `{program}` is installed and on PATH"))]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for `{program}`")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Classified result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The tool exited unsuccessfully. `stderr` may be empty.
    Failure { stderr: String },
}

/// Full record of one finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: i32,
    pub stderr: String,
}

impl ExecutionResult {
    /// `0` and [`BROKEN_PIPE_STATUS`] are successes, everything else fails.
    pub fn is_success(&self) -> bool {
        self.status == 0 || self.status == BROKEN_PIPE_STATUS
    }

    pub fn into_outcome(self) -> Outcome {
        if self.is_success() {
            Outcome::Success
        } else {
            Outcome::Failure {
                stderr: self.stderr,
            }
        }
    }
}

/// Run `command` to completion and classify the result.
///
/// `label` and `context` only feed the log: one info line per context entry
/// (or one bare line when the context is empty) carrying the exit status,
/// then an error line if the tool wrote anything to stderr, whatever the
/// classification.
pub async fn execute<R: ProcessRunner>(
    runner: &R,
    command: &Command,
    label: &str,
    context: &[(&str, &str)],
) -> Result<ExecutionResult, RunError> {
    tracing::debug!(argv = ?command.tokens(), "{label}: launching");

    let exit = runner.run(command).await?;
    let result = ExecutionResult {
        status: exit.status,
        stderr: String::from_utf8_lossy(&exit.stderr).into_owned(),
    };

    if context.is_empty() {
        tracing::info!(status = result.status, "{label} result=[{}]", result.status);
    }
    for (key, value) in context {
        tracing::info!(
            status = result.status,
            "{label} {key}=[{value}] result=[{}]",
            result.status
        );
    }

    if !result.stderr.trim().is_empty() {
        tracing::error!("{label} error = {}", result.stderr);
    }

    Ok(result)
}
