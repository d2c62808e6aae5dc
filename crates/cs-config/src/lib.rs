//! CitySafeSense configuration loading and validation.
//!
//! This crate provides:
//! - Typed structs for the windowing pipeline and the representative sampler
//! - Config resolution (CLI → env → config file → defaults)
//! - Semantic validation
//! - Config snapshots (with a content hash) for run summaries

pub mod pipeline;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use pipeline::{
    parse_feature_list, ConfigFile, PipelineConfig, PipelineOverrides, SamplerConfig,
    SamplerOverrides,
};
pub use resolve::{resolve_config, ConfigError, ConfigPaths, ConfigSource, ResolvedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
