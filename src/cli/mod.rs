pub mod space;

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

use crate::cli::space::CreateArgs;
use crate::cli::space::DeleteStorageClassArgs;
use crate::cli::space::PatchQuotaArgs;

/// vspace — provision per-tenant vcluster spaces with helm, vcluster and kubectl.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file. Defaults to the per-user config file if it exists.
    #[arg(long, global = true, env = "VSPACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kubeconfig passed to helm, vcluster and kubectl. A leading `~` is
    /// expanded.
    #[arg(long, global = true, env = "VSPACE_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Storage class deleted when `delete-storage-class` names none.
    #[arg(long, global = true, env = "VSPACE_BLOCK_STORAGE_CLASS")]
    pub block_storage_class: Option<String>,

    /// Print the command that would run instead of running it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes
    /// precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install the vcluster chart that backs a new space.
    Create(CreateArgs),
    /// Delete a storage class from inside a space.
    DeleteStorageClass(DeleteStorageClassArgs),
    /// Patch the resource quota of a space.
    PatchQuota(PatchQuotaArgs),
    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}
