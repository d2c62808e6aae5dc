//! Semantic validation of resolved configuration.

use crate::pipeline::{ConfigFile, PipelineConfig, SamplerConfig};
use thiserror::Error;

/// A single rejected configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration section.
pub type ValidationResult = Result<(), ValidationError>;

impl PipelineConfig {
    /// Reject values the windowing pipeline cannot run with.
    pub fn validate(&self) -> ValidationResult {
        if self.seq_len == 0 {
            return Err(ValidationError::new("pipeline.seq_len", "must be > 0"));
        }
        if self.stride == 0 {
            return Err(ValidationError::new("pipeline.stride", "must be > 0"));
        }
        if let Some(hz) = self.target_hz {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(ValidationError::new(
                    "pipeline.target_hz",
                    format!("must be a positive finite rate, got {hz}"),
                ));
            }
        }
        if let Some(features) = &self.features {
            if features.iter().any(|f| f.trim().is_empty()) {
                return Err(ValidationError::new(
                    "pipeline.features",
                    "feature names must not be empty",
                ));
            }
        }
        Ok(())
    }
}

impl SamplerConfig {
    /// Reject values the representative sampler cannot run with.
    pub fn validate(&self) -> ValidationResult {
        if self.num_samples == 0 {
            return Err(ValidationError::new("sampler.num_samples", "must be > 0"));
        }
        if self.seq_len == 0 {
            return Err(ValidationError::new("sampler.seq_len", "must be > 0"));
        }
        if self.features == 0 {
            return Err(ValidationError::new("sampler.features", "must be > 0"));
        }
        Ok(())
    }
}

impl ConfigFile {
    /// Validate both sections.
    pub fn validate(&self) -> ValidationResult {
        self.pipeline.validate()?;
        self.sampler.validate()
    }
}
