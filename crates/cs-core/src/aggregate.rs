//! Aggregate sample array: every window of a run stacked row-wise.

use crate::store;
use cs_common::{Error, Result};
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use std::path::Path;
use tracing::info;

/// Stack `windows` in order into `(sum(rows), features)`.
///
/// Returns `Ok(None)` for an empty sequence. All windows must share the
/// feature width of the first one.
pub fn stack_windows(windows: &[Array2<f32>]) -> Result<Option<Array2<f32>>> {
    let Some(first) = windows.first() else {
        return Ok(None);
    };
    let width = first.ncols();
    if let Some(bad) = windows.iter().find(|w| w.ncols() != width) {
        return Err(Error::FeatureWidthMismatch {
            expected: width,
            actual: bad.ncols(),
        });
    }
    let views: Vec<ArrayView2<'_, f32>> = windows.iter().map(|w| w.view()).collect();
    let stacked = concatenate(Axis(0), &views).map_err(|e| Error::InvalidShape {
        expected: format!("stackable windows ({e})"),
        actual: vec![windows.len(), width],
    })?;
    Ok(Some(stacked))
}

/// Stack and persist the aggregate. Returns the number of rows written, or
/// `None` when there was nothing to write (no file is created).
pub fn write_aggregate(windows: &[Array2<f32>], path: &Path) -> Result<Option<usize>> {
    let Some(stacked) = stack_windows(windows)? else {
        return Ok(None);
    };
    store::write_array(path, &stacked)?;
    info!(
        path = %path.display(),
        rows = stacked.nrows(),
        features = stacked.ncols(),
        "aggregate written"
    );
    Ok(Some(stacked.nrows()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn stacks_in_order() {
        let a = array![[1.0f32, 2.0], [3.0, 4.0]];
        let b = array![[5.0f32, 6.0]];
        let s = stack_windows(&[a, b]).unwrap().unwrap();
        assert_eq!(s, array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]]);
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.npy");
        assert_eq!(write_aggregate(&[], &path).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn mixed_widths_are_rejected() {
        let err = stack_windows(&[Array2::zeros((2, 3)), Array2::zeros((2, 4))]).unwrap_err();
        assert!(matches!(
            err,
            Error::FeatureWidthMismatch {
                expected: 3,
                actual: 4
            }
        ));
    }

    #[test]
    fn row_count_is_windows_times_seq_len() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.npy");
        let windows = vec![Array2::<f32>::ones((100, 5)); 7];
        assert_eq!(write_aggregate(&windows, &path).unwrap(), Some(700));
        assert_eq!(store::read_matrix(&path).unwrap().dim(), (700, 5));
    }
}
