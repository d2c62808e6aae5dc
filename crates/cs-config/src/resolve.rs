//! Config file discovery and loading.
//!
//! Priority, lowest first: built-in defaults, config file, environment,
//! command line. This module handles the first two; environment variables and
//! flags arrive through clap and are layered on with the `*Overrides` types.

use crate::pipeline::ConfigFile;
use crate::validate::ValidationError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "citysafesense";

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "pipeline.toml";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<ConfigError> for cs_common::Error {
    fn from(err: ConfigError) -> Self {
        cs_common::Error::Config(err.to_string())
    }
}

/// Candidate config file locations.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path given with `--config`; must exist when set.
    pub explicit: Option<PathBuf>,

    /// Per-user default location; used only when it exists.
    pub user_default: Option<PathBuf>,
}

impl ConfigPaths {
    /// Paths for an optional explicit file plus the platform default.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            user_default: dirs::config_dir()
                .map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
        }
    }

    /// Only the explicit path, ignoring per-user files.
    pub fn explicit_only(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            user_default: None,
        }
    }
}

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => write!(f, "defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A loaded configuration and its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ConfigFile,
    pub source: ConfigSource,
}

/// Load the first available config file, or fall back to defaults.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig, ConfigError> {
    if let Some(path) = &paths.explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.clone()));
        }
        return load_file(path);
    }
    if let Some(path) = &paths.user_default {
        if path.is_file() {
            return load_file(path);
        }
    }
    Ok(ResolvedConfig {
        config: ConfigFile::default(),
        source: ConfigSource::Defaults,
    })
}

fn load_file(path: &Path) -> Result<ResolvedConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    };
    Ok(ResolvedConfig {
        config,
        source: ConfigSource::File(path.to_path_buf()),
    })
}
