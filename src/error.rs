use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::runner::RunError;

/// Errors that can occur in vspace.
#[derive(Debug, Error, Diagnostic)]
pub enum VspaceError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// An external tool could not be run.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Run(#[from] RunError),
}
