//! Config snapshots recorded with each run.

use crate::pipeline::ConfigFile;
use crate::resolve::ConfigSource;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The effective configuration of a run plus a content hash, so two runs can
/// be compared without diffing every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub schema_version: String,
    /// `defaults` or the config file path.
    pub source: String,
    /// Hex SHA-256 of the compact JSON encoding of `config`.
    pub sha256: String,
    pub config: ConfigFile,
}

impl ConfigSnapshot {
    /// Capture the fully resolved configuration.
    pub fn capture(config: &ConfigFile, source: &ConfigSource) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(config)?;
        let digest = Sha256::digest(json.as_bytes());
        Ok(Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            source: source.to_string(),
            sha256: hex::encode(digest),
            config: config.clone(),
        })
    }
}
