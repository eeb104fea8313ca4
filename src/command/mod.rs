//! Rendering of space operations into argv token sequences.
//!
//! Every operation maps to exactly one invocation of `helm`, `vcluster` or
//! `kubectl`. Token order follows each tool's CLI grammar and is fixed; the
//! builder performs no I/O and never fails.

pub mod quoting;

use std::fmt;
use std::path::PathBuf;

use crate::command::quoting::QuotingPolicy;
use crate::config::Config;

/// Chart repository the vcluster chart is installed from.
pub const CHART_REPO_URL: &str = "https://charts.loft.sh";
/// Chart name within [`CHART_REPO_URL`].
pub const CHART_NAME: &str = "vcluster";
/// Pinned chart version.
pub const CHART_VERSION: &str = "0.15.5";

/// The external tool family a command targets.
///
/// The families disagree on how the kubeconfig flag is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Helm,
    Vcluster,
    Kubectl,
}

impl Tool {
    /// Program name followed by the fixed subcommand tokens.
    fn base(self) -> &'static [&'static str] {
        match self {
            Self::Helm => &["helm", "install"],
            Self::Vcluster => &["vcluster", "connect"],
            Self::Kubectl => &["kubectl", "patch", "-p"],
        }
    }

    fn kubeconfig_flag(self) -> &'static str {
        match self {
            Self::Vcluster => "--kube-config",
            Self::Helm | Self::Kubectl => "--kubeconfig",
        }
    }
}

/// A high-level request against a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Install the vcluster chart that materializes a space.
    Install {
        space_id: String,
        namespace: String,
        chart_path: String,
    },
    /// Delete a storage class from inside a space. `None` or an empty string
    /// selects the configured default block-storage class.
    DeleteStorageClass {
        space_id: String,
        storage_class_type: Option<String>,
    },
    /// Patch the resource quota of a space with a JSON merge body.
    PatchResourceQuota {
        space_id: String,
        resource_quota_json: String,
    },
}

impl Operation {
    /// The space this operation targets.
    pub fn space_id(&self) -> &str {
        match self {
            Self::Install { space_id, .. }
            | Self::DeleteStorageClass { space_id, .. }
            | Self::PatchResourceQuota { space_id, .. } => space_id,
        }
    }

    /// The tool family that executes this operation.
    pub fn tool(&self) -> Tool {
        match self {
            Self::Install { .. } => Tool::Helm,
            Self::DeleteStorageClass { .. } => Tool::Vcluster,
            Self::PatchResourceQuota { .. } => Tool::Kubectl,
        }
    }
}

/// One external-process invocation: the program is the first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    fn new(tokens: Vec<String>) -> Self {
        debug_assert!(!tokens.is_empty(), "a command needs a program");
        Self { tokens }
    }

    /// Program to launch.
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Arguments after the program.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// The full argv, program included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
impl Command {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(tokens.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Command {
    /// Renders a copy-pasteable POSIX shell line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let needs_quotes = token.is_empty()
                || token
                    .chars()
                    .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '$' | '`'));
            if needs_quotes {
                write!(f, "'{}'", token.replace('\'', r"'\''"))?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}

/// Renders [`Operation`]s into [`Command`]s.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    kube_config_path: Option<PathBuf>,
    default_storage_class: String,
    quoting: QuotingPolicy,
}

impl CommandBuilder {
    pub fn new(
        kube_config_path: Option<PathBuf>,
        default_storage_class: impl Into<String>,
        quoting: QuotingPolicy,
    ) -> Self {
        Self {
            kube_config_path,
            default_storage_class: default_storage_class.into(),
            quoting,
        }
    }

    /// Builder for the loaded configuration and the host's quoting policy.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.kube_config_path.clone(),
            config.block_storage.name.clone(),
            QuotingPolicy::detect(),
        )
    }

    /// Render an operation into its argv.
    pub fn build(&self, operation: &Operation) -> Command {
        let tool = operation.tool();
        let mut tokens: Vec<String> = tool.base().iter().map(|t| (*t).to_string()).collect();

        match operation {
            Operation::Install {
                space_id,
                namespace,
                chart_path,
            } => {
                self.push_credentials(tool, &mut tokens);
                tokens.extend([
                    space_id.clone(),
                    "--create-namespace".to_string(),
                    "-n".to_string(),
                    namespace.clone(),
                    "--repo".to_string(),
                    CHART_REPO_URL.to_string(),
                    CHART_NAME.to_string(),
                    "--version".to_string(),
                    CHART_VERSION.to_string(),
                    "-f".to_string(),
                    chart_path.clone(),
                ]);
            }
            Operation::DeleteStorageClass {
                space_id,
                storage_class_type,
            } => {
                self.push_credentials(tool, &mut tokens);
                let class = storage_class_type
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .unwrap_or(&self.default_storage_class);
                tokens.extend([
                    space_id.clone(),
                    "--".to_string(),
                    "kubectl".to_string(),
                    "delete".to_string(),
                    "sc".to_string(),
                    class.to_string(),
                ]);
            }
            Operation::PatchResourceQuota {
                space_id,
                resource_quota_json,
            } => {
                tokens.extend([
                    self.quoting.quote_json(resource_quota_json).into_owned(),
                    "resourcequota".to_string(),
                    format!("{space_id}-quota"),
                    "--namespace".to_string(),
                    format!("vcluster-{space_id}"),
                ]);
                // kubectl takes the kubeconfig flag after the target here.
                self.push_credentials(tool, &mut tokens);
            }
        }

        Command::new(tokens)
    }

    fn push_credentials(&self, tool: Tool, tokens: &mut Vec<String>) {
        if let Some(path) = &self.kube_config_path {
            tokens.push(tool.kubeconfig_flag().to_string());
            tokens.push(path.to_string_lossy().into_owned());
        }
    }
}
