//! Text summaries of persisted windows.

use crate::store;
use cs_common::Result;
use cs_math::{column_stats, ColumnStats};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Shape and per-feature statistics of one `.npy` array.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub path: PathBuf,
    /// `[rows, features]`
    pub shape: [usize; 2],
    pub columns: Vec<ColumnStats>,
}

/// Load `path` and summarize it.
pub fn summarize(path: &Path) -> Result<WindowSummary> {
    let data = store::read_matrix(path)?;
    Ok(WindowSummary {
        path: path.to_path_buf(),
        shape: [data.nrows(), data.ncols()],
        columns: column_stats(data.view()),
    })
}

/// First window in `dir` by name, if any.
pub fn first_window(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(store::list_npy_files(dir)?.into_iter().next())
}

impl fmt::Display for WindowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} rows x {} features",
            self.path.display(),
            self.shape[0],
            self.shape[1]
        )?;
        writeln!(f, "{:>4}  {:>10}  {:>10}  {:>10}  {:>10}", "feat", "mean", "std", "min", "max")?;
        for (i, c) in self.columns.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:>10.4}  {:>10.4}  {:>10.4}  {:>10.4}",
                i, c.mean, c.std, c.min, c.max
            )?;
        }
        Ok(())
    }
}
