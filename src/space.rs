//! Space lifecycle operations.
//!
//! Each operation renders one command, runs it and hands back the classified
//! outcome. Retrying is left to the caller.

use crate::command::Command;
use crate::command::CommandBuilder;
use crate::command::Operation;
use crate::runner::Outcome;
use crate::runner::RunError;
use crate::runner::execute;
use crate::runner::process::ProcessRunner;

/// Drives helm, vcluster and kubectl on behalf of space requests.
pub struct SpaceService<R> {
    builder: CommandBuilder,
    runner: R,
}

impl<R: ProcessRunner> SpaceService<R> {
    pub fn new(builder: CommandBuilder, runner: R) -> Self {
        Self { builder, runner }
    }

    /// The command an operation would run, without running it.
    pub fn render(&self, operation: &Operation) -> Command {
        self.builder.build(operation)
    }

    /// Install the vcluster chart for a new space.
    pub async fn create_space(
        &self,
        space_id: &str,
        namespace: &str,
        chart_path: &str,
    ) -> Result<Outcome, RunError> {
        let operation = Operation::Install {
            space_id: space_id.to_string(),
            namespace: namespace.to_string(),
            chart_path: chart_path.to_string(),
        };
        self.run(&operation, "created vcluster").await
    }

    /// Delete a storage class inside a space; `None` deletes the configured
    /// default block-storage class.
    pub async fn delete_storage_class(
        &self,
        space_id: &str,
        storage_class_type: Option<&str>,
    ) -> Result<Outcome, RunError> {
        let operation = Operation::DeleteStorageClass {
            space_id: space_id.to_string(),
            storage_class_type: storage_class_type.map(str::to_string),
        };
        self.run(&operation, "delete vcluster storage class").await
    }

    /// Patch the resource quota of a space.
    pub async fn patch_resource_quota(
        &self,
        space_id: &str,
        resource_quota_json: &str,
    ) -> Result<Outcome, RunError> {
        let operation = Operation::PatchResourceQuota {
            space_id: space_id.to_string(),
            resource_quota_json: resource_quota_json.to_string(),
        };
        self.run(&operation, "patch vcluster resource quota").await
    }

    async fn run(&self, operation: &Operation, label: &str) -> Result<Outcome, RunError> {
        let command = self.builder.build(operation);
        let result = execute(
            &self.runner,
            &command,
            label,
            &[("spaceId", operation.space_id())],
        )
        .await?;
        Ok(result.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::command::quoting::QuotingPolicy;
    use crate::runner::process::ProcessExit;
    use crate::runner::process::TokioProcessRunner;

    // -- Recording runner --

    type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

    struct RecordingRunner {
        calls: CallLog,
        status: i32,
        stderr: &'static str,
    }

    impl RecordingRunner {
        fn new(status: i32, stderr: &'static str) -> (Self, CallLog) {
            let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: Arc::clone(&calls),
                    status,
                    stderr,
                },
                calls,
            )
        }
    }

    impl ProcessRunner for RecordingRunner {
        async fn run(&self, command: &Command) -> Result<ProcessExit, RunError> {
            self.calls.lock().unwrap().push(command.tokens().to_vec());
            Ok(ProcessExit {
                status: self.status,
                stderr: self.stderr.as_bytes().to_vec(),
            })
        }
    }

    fn builder() -> CommandBuilder {
        CommandBuilder::new(
            Some(PathBuf::from("/kube/config")),
            "ebs-sc",
            QuotingPolicy::Verbatim,
        )
    }

    #[tokio::test]
    async fn create_space_runs_helm_install() {
        let (runner, calls) = RecordingRunner::new(0, "");
        let service = SpaceService::new(builder(), runner);

        let outcome = service
            .create_space("s1", "vcluster-s1", "values.yaml")
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Success);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(&calls[0][..5], &["helm", "install", "--kubeconfig", "/kube/config", "s1"]);
    }

    #[tokio::test]
    async fn delete_storage_class_reports_failure() {
        let (runner, calls) = RecordingRunner::new(1, "storageclass \"ebs-sc\" not found");
        let service = SpaceService::new(builder(), runner);

        let outcome = service.delete_storage_class("s1", None).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Failure {
                stderr: "storageclass \"ebs-sc\" not found".into()
            }
        );
        assert_eq!(calls.lock().unwrap()[0].last().map(String::as_str), Some("ebs-sc"));
    }

    #[tokio::test]
    async fn patch_resource_quota_broken_pipe_is_success() {
        let (runner, calls) = RecordingRunner::new(141, "");
        let service = SpaceService::new(builder(), runner);

        let outcome = service
            .patch_resource_quota("abc", r#"{"spec":{"hard":{"cpu":"2"}}}"#)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(calls.lock().unwrap()[0][5], "abc-quota");
    }

    #[test]
    fn render_does_not_run() {
        let (runner, calls) = RecordingRunner::new(0, "");
        let service = SpaceService::new(builder(), runner);
        let cmd = service.render(&Operation::DeleteStorageClass {
            space_id: "s1".into(),
            storage_class_type: Some("fast-ssd".into()),
        });
        assert_eq!(cmd.program(), "vcluster");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_tool_is_raised_not_classified() {
        let builder = CommandBuilder::new(None, "ebs-sc", QuotingPolicy::Verbatim);
        let service = SpaceService::new(builder, MissingToolRunner);
        let err = service.delete_storage_class("s1", None).await.unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    struct MissingToolRunner;

    impl ProcessRunner for MissingToolRunner {
        async fn run(&self, command: &Command) -> Result<ProcessExit, RunError> {
            Err(RunError::Spawn {
                program: command.program().to_string(),
                source: std::io::ErrorKind::NotFound.into(),
            })
        }
    }

    /// Two spaces run at the same time through real processes; each gets
    /// its own stderr and classification.
    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_runs_are_independent() {
        let runner = TokioProcessRunner;
        let a = Command::from_tokens(["sh", "-c", "sleep 0.2; printf 'space-a failed' >&2; exit 1"]);
        let b = Command::from_tokens(["sh", "-c", "printf 'space-b warning' >&2; exit 0"]);

        let (ra, rb) = tokio::join!(
            execute(&runner, &a, "label", &[("spaceId", "a")]),
            execute(&runner, &b, "label", &[("spaceId", "b")]),
        );

        assert_eq!(
            ra.unwrap().into_outcome(),
            Outcome::Failure {
                stderr: "space-a failed".into()
            }
        );
        let rb = rb.unwrap();
        assert_eq!(rb.stderr, "space-b warning");
        assert_eq!(rb.into_outcome(), Outcome::Success);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn real_process_outcomes() {
        let runner = TokioProcessRunner;
        let cases = [
            ("exit 0", Outcome::Success),
            ("kill -PIPE $$", Outcome::Success),
            ("exit 141", Outcome::Success),
            (
                "printf boom >&2; exit 1",
                Outcome::Failure {
                    stderr: "boom".into(),
                },
            ),
        ];
        for (script, expected) in cases {
            let cmd = Command::from_tokens(["sh", "-c", script]);
            let result = execute(&runner, &cmd, "label", &[]).await.unwrap();
            assert_eq!(result.into_outcome(), expected, "script {script}");
        }
    }
}
