//! Per-column window statistics and standardization.
//!
//! Windows are standardized column by column: `(x - mean) / (std + STD_FLOOR)`
//! with the population standard deviation. Accumulation happens in f64 even
//! though windows are stored as f32, so the standardized columns land within
//! f32 rounding of mean 0 / std 1.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Added to every column std before dividing, so constant columns map to 0.
pub const STD_FLOOR: f64 = 1e-6;

/// Summary statistics of one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

fn column_mean_std(col: ArrayView1<'_, f32>) -> (f64, f64) {
    let n = col.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let m = col.iter().map(|&v| f64::from(v)).sum::<f64>() / n as f64;
    let var = col
        .iter()
        .map(|&v| (f64::from(v) - m).powi(2))
        .sum::<f64>()
        / n as f64;
    (m, var.sqrt())
}

/// Standardize every column of `window` in place.
pub fn standardize_columns(window: &mut Array2<f32>) {
    for mut col in window.axis_iter_mut(Axis(1)) {
        let (m, s) = column_mean_std(col.view());
        let denom = s + STD_FLOOR;
        col.mapv_inplace(|v| ((f64::from(v) - m) / denom) as f32);
    }
}

/// Statistics for every column of a 2-D array.
pub fn column_stats(data: ArrayView2<'_, f32>) -> Vec<ColumnStats> {
    data.axis_iter(Axis(1))
        .map(|col| {
            let (m, s) = column_mean_std(col);
            let (min, max) = col.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                let v = f64::from(v);
                (lo.min(v), hi.max(v))
            });
            ColumnStats {
                mean: m,
                std: s,
                min,
                max,
            }
        })
        .collect()
}
