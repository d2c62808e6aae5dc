//! Error types for CitySafeSense.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the sensor pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Input errors (20-29)
    #[error("no CSV files found in {}", .dir.display())]
    NoInput { dir: PathBuf },

    #[error("none of the requested columns {requested:?} found in {}", .path.display())]
    ColumnNotFound {
        path: PathBuf,
        requested: Vec<String>,
    },

    #[error("column '{column}' in {} is not numeric", .path.display())]
    NonNumericColumn { path: PathBuf, column: String },

    #[error("{} has no usable rows", .path.display())]
    EmptyTable { path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Resampling errors (30-39)
    #[error("resampling failed: {0}")]
    Resampling(String),

    // Window and aggregate errors (40-49)
    #[error("invalid array shape: expected {expected}, got {actual:?}")]
    InvalidShape { expected: String, actual: Vec<usize> },

    #[error("window feature width mismatch: expected {expected}, got {actual}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    // Sampling errors (50-59)
    #[error("failed to load window {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NPY read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("NPY write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::NoInput { .. } => 20,
            Error::ColumnNotFound { .. } => 21,
            Error::NonNumericColumn { .. } => 22,
            Error::EmptyTable { .. } => 23,
            Error::Csv(_) => 24,
            Error::Resampling(_) => 30,
            Error::InvalidShape { .. } => 40,
            Error::FeatureWidthMismatch { .. } => 41,
            Error::Load { .. } => 50,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::NpyRead(_) => 62,
            Error::NpyWrite(_) => 63,
        }
    }

    /// Whether the error is caused by the content of a single input and can
    /// be skipped without aborting the run.
    ///
    /// Storage failures (`Io`, `NpyWrite`, `Json`) and configuration errors
    /// are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ColumnNotFound { .. }
                | Error::NonNumericColumn { .. }
                | Error::EmptyTable { .. }
                | Error::Csv(_)
                | Error::Resampling(_)
                | Error::InvalidShape { .. }
                | Error::FeatureWidthMismatch { .. }
                | Error::Load { .. }
                | Error::NpyRead(_)
        )
    }
}
