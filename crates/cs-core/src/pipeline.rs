//! Batch runner: a directory of CSV recordings in, windows, aggregate sample
//! and metadata out.
//!
//! Output layout under `out_dir`:
//!
//! ```text
//! rep_windows/<stem>_<i>.npy   one standardized window per file
//! sample.npy                   all windows stacked row-wise
//! metadata.json                one record per window, in write order
//! ```
//!
//! Input files are processed one at a time in name order. A file that fails
//! is reported and skipped; output directory creation and the final
//! aggregate and metadata writes abort the run.

use crate::aggregate::write_aggregate;
use crate::ingest::read_csv;
use crate::resample::resample;
use crate::store;
use crate::window::{select_features, SourceFile, WindowBatch, WindowMetadata, WindowingEngine};
use chrono::{DateTime, Utc};
use cs_common::{Error, Result, RunId};
use cs_config::PipelineConfig;
use ndarray::Array2;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of input recordings.
pub const CSV_EXTENSION: &str = "csv";

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Windowed { windows: usize, resampled: bool },
    Skipped { code: u32, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Result of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
    pub files: Vec<FileReport>,
    pub windows_written: usize,
    /// Rows in `sample.npy`; `None` when it was not written.
    pub sample_rows: Option<usize>,
    pub metadata_path: PathBuf,
    /// SHA-256 of the resolved configuration, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Skipped { .. }))
            .count()
    }

    /// Some files were skipped.
    pub fn is_partial(&self) -> bool {
        self.skipped() > 0
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }
}

/// CSV files directly inside `dir`, sorted by name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    store::list_with_extension(dir, CSV_EXTENSION)
}

/// Window one recording.
///
/// The timestamp column is resampled onto a uniform grid when `target_hz` is
/// set; if that fails the raw rows are windowed instead.
pub fn process_file(
    engine: &WindowingEngine,
    config: &PipelineConfig,
    path: &Path,
) -> Result<WindowBatch> {
    let table = read_csv(path)?;
    if table.n_rows() == 0 {
        return Err(Error::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    let time_column = table.time_column().map(str::to_string);

    let (table, resampled) = match (time_column.as_deref(), config.target_hz) {
        (Some(tc), Some(hz)) => match resample(&table, tc, hz) {
            Ok(series) => {
                debug!(
                    path = %path.display(),
                    period_ms = series.period_ms,
                    rows = series.table.n_rows(),
                    "resampled onto uniform grid"
                );
                (series.table, true)
            }
            Err(e) => {
                let err = Error::from(e);
                warn!(
                    path = %path.display(),
                    code = err.code(),
                    error = %err,
                    "resampling failed, using raw rows"
                );
                (table, false)
            }
        },
        (None, Some(_)) => {
            warn!(path = %path.display(), "no timestamp column, using raw rows");
            (table, false)
        }
        _ => (table, false),
    };

    let matrix = select_features(
        &table,
        config.features.as_deref(),
        time_column.as_deref(),
        path,
    )?;
    engine.emit(&matrix, &SourceFile::from_path(path), 0, resampled)
}

/// Run the pipeline over every CSV in `config.input_dir`.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let started_at = Utc::now();
    let run_id = RunId::new();

    let inputs = list_csv_files(&config.input_dir)?;
    if inputs.is_empty() {
        return Err(Error::NoInput {
            dir: config.input_dir.clone(),
        });
    }

    let windows_dir = config.windows_dir();
    std::fs::create_dir_all(&windows_dir)?;
    info!(
        %run_id,
        files = inputs.len(),
        input_dir = %config.input_dir.display(),
        out_dir = %config.out_dir.display(),
        "windowing run started"
    );

    let engine = WindowingEngine::new(config.seq_len, config.stride, windows_dir);
    let mut reports = Vec::with_capacity(inputs.len());
    let mut windows: Vec<Array2<f32>> = Vec::new();
    let mut metadata: Vec<WindowMetadata> = Vec::new();

    for path in inputs {
        let status = match process_file(&engine, config, &path) {
            Ok(batch) => {
                let resampled = batch.metadata.first().is_some_and(|m| m.resampled);
                let count = batch.windows.len();
                info!(path = %path.display(), windows = count, resampled, "file windowed");
                windows.extend(batch.windows.into_iter().map(|w| w.data));
                metadata.extend(batch.metadata);
                FileStatus::Windowed {
                    windows: count,
                    resampled,
                }
            }
            Err(e) => {
                warn!(path = %path.display(), code = e.code(), error = %e, "file skipped");
                FileStatus::Skipped {
                    code: e.code(),
                    reason: e.to_string(),
                }
            }
        };
        reports.push(FileReport { path, status });
    }

    let sample_rows = match write_aggregate(&windows, &config.sample_path()) {
        Ok(rows) => rows,
        Err(e @ Error::FeatureWidthMismatch { .. }) => {
            warn!(code = e.code(), error = %e, "aggregate skipped");
            None
        }
        Err(e) => return Err(e),
    };

    let metadata_path = config.metadata_path();
    std::fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)?;

    let summary = RunSummary {
        run_id,
        started_at,
        input_dir: config.input_dir.clone(),
        out_dir: config.out_dir.clone(),
        files: reports,
        windows_written: metadata.len(),
        sample_rows,
        metadata_path,
        config_hash: None,
    };
    info!(
        run_id = %summary.run_id,
        windows = summary.windows_written,
        skipped = summary.skipped(),
        "windowing run finished"
    );
    Ok(summary)
}
