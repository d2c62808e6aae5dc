//! `.npy` persistence for windows, aggregates, and synthetic arrays.

use cs_common::{Error, Result};
use ndarray::{Array2, ArrayD, Axis, Dimension, Ix1, Ix2};
use ndarray_npy::{ReadNpyError, WritableElement};
use std::path::{Path, PathBuf};

/// Extension used for every persisted array.
pub const NPY_EXTENSION: &str = "npy";

/// Write an array to `path`, replacing any existing file.
pub fn write_array<A, D>(path: &Path, array: &ndarray::Array<A, D>) -> Result<()>
where
    A: WritableElement,
    D: Dimension,
{
    ndarray_npy::write_npy(path, array)?;
    Ok(())
}

/// Read any-rank f32 data, accepting f64 files by narrowing them.
pub fn read_f32(path: &Path) -> Result<ArrayD<f32>> {
    match ndarray_npy::read_npy::<_, ArrayD<f32>>(path) {
        Ok(arr) => Ok(arr),
        Err(ReadNpyError::WrongDescriptor(_)) => {
            let wide: ArrayD<f64> = ndarray_npy::read_npy(path)?;
            Ok(wide.mapv(|v| v as f32))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read a `(rows, features)` array. One-dimensional files are treated as a
/// single feature column.
pub fn read_matrix(path: &Path) -> Result<Array2<f32>> {
    let arr = read_f32(path)?;
    match arr.ndim() {
        1 => Ok(arr
            .into_dimensionality::<Ix1>()
            .map_err(|e| shape_error(e, "1-D"))?
            .insert_axis(Axis(1))),
        2 => arr
            .into_dimensionality::<Ix2>()
            .map_err(|e| shape_error(e, "2-D")),
        _ => Err(Error::InvalidShape {
            expected: "(rows, features)".to_string(),
            actual: arr.shape().to_vec(),
        }),
    }
}

fn shape_error(err: ndarray::ShapeError, expected: &str) -> Error {
    Error::InvalidShape {
        expected: format!("{expected} array ({err})"),
        actual: Vec::new(),
    }
}

/// `.npy` files directly inside `dir`, sorted by name. A missing directory
/// yields an empty list.
pub fn list_npy_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_with_extension(dir, NPY_EXTENSION)
}

/// Files directly inside `dir` with the given extension, sorted by name.
/// A missing directory yields an empty list.
pub fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
