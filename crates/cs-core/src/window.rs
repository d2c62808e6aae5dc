//! Windowing engine: feature selection, slicing, padding, normalization and
//! per-window persistence.
//!
//! Windows start at `0, stride, 2*stride, ...` while
//! `start < max(1, T - seq_len + 1)`, so a recording shorter than `seq_len`
//! still produces exactly one window. Short slices are zero-padded at the
//! end, then every column is standardized independently within the window.

use crate::ingest::{ColumnData, RecordTable};
use crate::store;
use cs_common::{Error, Result};
use cs_math::standardize_columns;
use ndarray::{s, Array2, ArrayView2};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Feature columns extracted from a record table as an f32 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    /// `(rows, columns.len())`
    pub data: Array2<f32>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }
}

/// Pick the feature columns of `table`.
///
/// With a `requested` list, the requested columns that exist are kept in the
/// caller's order; if none exist the file is rejected with
/// [`Error::ColumnNotFound`]. Without a list, every numeric column except
/// `time_column` is used. A selected column holding text is rejected with
/// [`Error::NonNumericColumn`].
pub fn select_features(
    table: &RecordTable,
    requested: Option<&[String]>,
    time_column: Option<&str>,
    path: &Path,
) -> Result<FeatureMatrix> {
    let names: Vec<&str> = match requested {
        Some(list) => {
            let present: Vec<&str> = list
                .iter()
                .map(String::as_str)
                .filter(|name| table.column(name).is_some())
                .collect();
            if present.is_empty() {
                return Err(Error::ColumnNotFound {
                    path: path.to_path_buf(),
                    requested: list.to_vec(),
                });
            }
            present
        }
        None => table
            .columns()
            .iter()
            .filter(|c| Some(c.name.as_str()) != time_column && c.data.is_numeric())
            .map(|c| c.name.as_str())
            .collect(),
    };
    if names.is_empty() {
        return Err(Error::ColumnNotFound {
            path: path.to_path_buf(),
            requested: Vec::new(),
        });
    }

    let n_rows = table.n_rows();
    let mut data = Array2::<f32>::zeros((n_rows, names.len()));
    for (j, name) in names.iter().enumerate() {
        let column = table.column(name).ok_or_else(|| Error::ColumnNotFound {
            path: path.to_path_buf(),
            requested: vec![name.to_string()],
        })?;
        match &column.data {
            ColumnData::Numeric(values) => {
                for (i, v) in values.iter().enumerate() {
                    data[[i, j]] = *v as f32;
                }
            }
            ColumnData::Text(_) => {
                return Err(Error::NonNumericColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
            }
        }
    }

    Ok(FeatureMatrix {
        columns: names.into_iter().map(str::to_string).collect(),
        data,
    })
}

/// Row offsets at which windows start.
pub fn window_starts(n_rows: usize, seq_len: usize, stride: usize) -> impl Iterator<Item = usize> {
    let limit = n_rows.saturating_sub(seq_len).saturating_add(1).max(1);
    (0..limit).step_by(stride.max(1))
}

/// Number of windows [`window_starts`] yields.
pub fn window_count(n_rows: usize, seq_len: usize, stride: usize) -> usize {
    let limit = n_rows.saturating_sub(seq_len).saturating_add(1).max(1);
    limit.div_ceil(stride.max(1))
}

/// Rows `[start, start + seq_len)` of `data`, zero-padded at the end and
/// standardized per column.
pub fn cut_window(data: ArrayView2<'_, f32>, start: usize, seq_len: usize) -> Array2<f32> {
    let n_rows = data.nrows();
    let end = (start + seq_len).min(n_rows);
    let mut window = Array2::<f32>::zeros((seq_len, data.ncols()));
    if start < end {
        window
            .slice_mut(s![..end - start, ..])
            .assign(&data.slice(s![start..end, ..]));
    }
    standardize_columns(&mut window);
    window
}

/// One normalized window and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Position within its source file, zero-based.
    pub index: usize,
    pub start_row: usize,
    pub data: Array2<f32>,
}

/// Metadata record for one persisted window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WindowMetadata {
    /// Window file name inside the windows directory.
    pub file: String,
    /// Path of the CSV the window was cut from.
    pub source: String,
    /// First source row (after resampling, when applied).
    pub start_row: usize,
    /// One past the last covered row; may exceed the row count for padded windows.
    pub end_row: usize,
    /// Whether the source rows were resampled onto a uniform grid first.
    #[serde(default)]
    pub resampled: bool,
}

/// Identity of the input file being windowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File stem, used to namespace window files.
    pub tag: String,
}

impl SourceFile {
    pub fn from_path(path: &Path) -> Self {
        let tag = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string());
        Self {
            path: path.to_path_buf(),
            tag,
        }
    }
}

/// `<tag>_<index>.npy`
pub fn window_file_name(tag: &str, index: usize) -> String {
    format!("{tag}_{index}.{}", store::NPY_EXTENSION)
}

/// Windows and metadata produced from one source.
#[derive(Debug, Clone, Default)]
pub struct WindowBatch {
    pub windows: Vec<Window>,
    pub metadata: Vec<WindowMetadata>,
    /// Index the next window of the same source would get.
    pub next_index: usize,
}

/// Slices matrices into windows and writes each to its own file.
#[derive(Debug, Clone)]
pub struct WindowingEngine {
    seq_len: usize,
    stride: usize,
    out_dir: PathBuf,
}

impl WindowingEngine {
    pub fn new(seq_len: usize, stride: usize, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            seq_len,
            stride,
            out_dir: out_dir.into(),
        }
    }

    /// Cut every window of `data` without touching storage.
    ///
    /// Indices start at `first_index` and increase by one per window.
    pub fn cut(&self, data: ArrayView2<'_, f32>, first_index: usize) -> Vec<Window> {
        window_starts(data.nrows(), self.seq_len, self.stride)
            .enumerate()
            .map(|(k, start)| Window {
                index: first_index + k,
                start_row: start,
                data: cut_window(data, start, self.seq_len),
            })
            .collect()
    }

    /// Cut and persist the windows of one source file.
    ///
    /// Files already written stay on disk if a later write fails.
    pub fn emit(
        &self,
        matrix: &FeatureMatrix,
        source: &SourceFile,
        first_index: usize,
        resampled: bool,
    ) -> Result<WindowBatch> {
        let windows = self.cut(matrix.data.view(), first_index);
        let mut metadata = Vec::with_capacity(windows.len());
        for window in &windows {
            let file = window_file_name(&source.tag, window.index);
            store::write_array(&self.out_dir.join(&file), &window.data)?;
            debug!(%file, start_row = window.start_row, "window written");
            metadata.push(WindowMetadata {
                file,
                source: source.path.display().to_string(),
                start_row: window.start_row,
                end_row: window.start_row + self.seq_len,
                resampled,
            });
        }
        Ok(WindowBatch {
            next_index: first_index + windows.len(),
            windows,
            metadata,
        })
    }
}
