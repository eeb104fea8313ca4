use clap::Args;

use crate::quota::parse_limit;

/// Arguments for the `create` subcommand.
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Identifier of the space; also the helm release name.
    pub space_id: String,

    /// Namespace the vcluster is installed into. Defaults to
    /// `vcluster-<SPACE_ID>`.
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Chart values file.
    #[arg(short = 'f', long)]
    pub values: String,
}

/// Arguments for the `delete-storage-class` subcommand.
#[derive(Debug, Args)]
pub struct DeleteStorageClassArgs {
    pub space_id: String,

    /// Storage class to delete. Defaults to the configured block-storage
    /// class.
    #[arg(long = "type", value_name = "CLASS")]
    pub storage_class_type: Option<String>,
}

/// Arguments for the `patch-quota` subcommand.
#[derive(Debug, Args)]
pub struct PatchQuotaArgs {
    pub space_id: String,

    /// Raw JSON patch body, passed to `kubectl patch -p` as is.
    #[arg(required_unless_present = "hard", conflicts_with = "hard")]
    pub json: Option<String>,

    /// Hard limit as RESOURCE=QUANTITY, e.g. `limits.cpu=4`. Repeatable.
    #[arg(long, value_name = "RESOURCE=QUANTITY", value_parser = parse_limit)]
    pub hard: Vec<(String, String)>,
}
