mod cli;
mod command;
mod config;
mod error;
mod quota;
mod runner;
mod space;

use std::process::ExitCode;
use std::time::Duration;

use clap::CommandFactory;
use clap::Parser;
use console::style;
use miette::Result;
use miette::WrapErr;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::GlobalArgs;
use crate::command::CommandBuilder;
use crate::command::Operation;
use crate::config::Config;
use crate::config::Overrides;
use crate::error::VspaceError;
use crate::quota::ResourceQuotaPatch;
use crate::runner::Outcome;
use crate::runner::process::TokioProcessRunner;
use crate::space::SpaceService;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            env!("CARGO_PKG_NAME"),
            &mut std::io::stdout(),
        );
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing(cli.global.verbose);

    let config = load_config(&cli.global).wrap_err("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let service = SpaceService::new(CommandBuilder::from_config(&config), TokioProcessRunner);
    let Some((operation, label)) = operation_for(cli.command) else {
        return Ok(ExitCode::SUCCESS);
    };

    if cli.global.dry_run {
        println!("{}", service.render(&operation));
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = run_with_spinner(&service, &operation)
        .await
        .wrap_err_with(|| format!("failed to {label} for space '{}'", operation.space_id()))?;

    Ok(report(&outcome, label, operation.space_id()))
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(global: &GlobalArgs) -> Result<Config, VspaceError> {
    let overrides = Overrides {
        kube_config_path: global.kubeconfig.clone(),
        block_storage_class: global.block_storage_class.clone(),
    };
    Ok(Config::load(global.config.as_deref(), overrides)?)
}

/// Map a subcommand to its operation and a short verb phrase for messages.
fn operation_for(command: Commands) -> Option<(Operation, &'static str)> {
    match command {
        Commands::Create(args) => {
            let namespace = args
                .namespace
                .unwrap_or_else(|| format!("vcluster-{}", args.space_id));
            Some((
                Operation::Install {
                    space_id: args.space_id,
                    namespace,
                    chart_path: args.values,
                },
                "create space",
            ))
        }
        Commands::DeleteStorageClass(args) => Some((
            Operation::DeleteStorageClass {
                space_id: args.space_id,
                storage_class_type: args.storage_class_type,
            },
            "delete storage class",
        )),
        Commands::PatchQuota(args) => {
            let resource_quota_json = args
                .json
                .unwrap_or_else(|| ResourceQuotaPatch::from_limits(args.hard).to_json());
            Some((
                Operation::PatchResourceQuota {
                    space_id: args.space_id,
                    resource_quota_json,
                },
                "patch resource quota",
            ))
        }
        Commands::Completions { .. } => None,
    }
}

async fn run_with_spinner(
    service: &SpaceService<TokioProcessRunner>,
    operation: &Operation,
) -> Result<Outcome, VspaceError> {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Running {}", service.render(operation)));

    let outcome = match operation {
        Operation::Install {
            space_id,
            namespace,
            chart_path,
        } => service.create_space(space_id, namespace, chart_path).await,
        Operation::DeleteStorageClass {
            space_id,
            storage_class_type,
        } => {
            service
                .delete_storage_class(space_id, storage_class_type.as_deref())
                .await
        }
        Operation::PatchResourceQuota {
            space_id,
            resource_quota_json,
        } => {
            service
                .patch_resource_quota(space_id, resource_quota_json)
                .await
        }
    };

    pb.finish_and_clear();
    Ok(outcome?)
}

fn report(outcome: &Outcome, label: &str, space_id: &str) -> ExitCode {
    match outcome {
        Outcome::Success => {
            println!("{} {label}: {space_id}", style("✓").green().bold());
            ExitCode::SUCCESS
        }
        Outcome::Failure { stderr } => {
            eprintln!("{} {label}: {space_id}", style("✗").red().bold());
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                eprintln!("{}", style(stderr).dim());
            }
            ExitCode::FAILURE
        }
    }
}
