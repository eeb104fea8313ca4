//! Configuration loading.
//!
//! Configuration is read once at startup from a TOML file and passed
//! explicitly to whatever needs it. Example:
//!
//! ```toml
//! kube_config_path = "~/.kube/tenant-cluster"
//!
//! [block_storage]
//! name = "ebs-sc"
//! ```

use std::path::Path;
use std::path::PathBuf;

use directories::BaseDirs;
use directories::ProjectDirs;
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

/// Storage class removed from a space when the caller names none.
pub const DEFAULT_BLOCK_STORAGE_CLASS: &str = "ebs-sc";

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    #[diagnostic(help("see `vspace --help` for the expected keys"))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot expand `~` in kubeconfig path: no home directory found")]
    #[diagnostic(help("use an absolute kubeconfig path or set HOME"))]
    NoHomeDir,
}

/// Block-storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlockStorage {
    /// Default storage class deleted from new spaces.
    pub name: String,
}

impl Default for BlockStorage {
    fn default() -> Self {
        Self {
            name: DEFAULT_BLOCK_STORAGE_CLASS.to_string(),
        }
    }
}

/// Process-wide settings, immutable after [`Config::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Kubeconfig handed to helm, vcluster and kubectl. When unset the tools
    /// fall back to `$HOME/.kube/config`.
    pub kube_config_path: Option<PathBuf>,
    pub block_storage: BlockStorage,
}

/// Command-line overrides applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub kube_config_path: Option<PathBuf>,
    pub block_storage_class: Option<String>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the per-user config file
    /// is read if present, otherwise defaults are used. Overrides win over
    /// file values, and a leading `~` in the kubeconfig path is expanded
    /// afterwards.
    pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        if let Some(kube_config_path) = overrides.kube_config_path {
            config.kube_config_path = Some(kube_config_path);
        }
        if let Some(name) = overrides.block_storage_class {
            config.block_storage.name = name;
        }

        if let Some(raw) = config.kube_config_path.take() {
            let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
            config.kube_config_path = Some(expand_tilde(&raw, home.as_deref())?);
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Location of the per-user config file, e.g.
/// `~/.config/vspace/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Replace a leading `~` with `home`. Only the first component is touched.
fn expand_tilde(path: &Path, home: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let Some(text) = path.to_str() else {
        return Ok(path.to_path_buf());
    };
    let Some(rest) = text.strip_prefix('~') else {
        return Ok(path.to_path_buf());
    };
    // `~user/...` is left alone.
    if !(rest.is_empty() || rest.starts_with(['/', '\\'])) {
        return Ok(path.to_path_buf());
    }
    let home = home.ok_or(ConfigError::NoHomeDir)?;
    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}
