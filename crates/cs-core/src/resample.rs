//! Resampling of irregularly timed recordings onto a uniform grid.
//!
//! The grid starts at the earliest parsable timestamp and advances by
//! `round(1000 / target_hz)` milliseconds without passing the latest one.
//! Each numeric column is linearly interpolated in time between the nearest
//! surviving samples; grid points never extend beyond the recording, so no
//! extrapolation happens.

use crate::ingest::{parse_time_column, Column, ColumnData, RecordTable};
use cs_math::interp_onto;
use thiserror::Error;
use tracing::debug;

/// Why a table could not be resampled.
///
/// Callers treat every variant as recoverable: the raw rows are used as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    #[error("target rate must be positive and finite, got {0}")]
    InvalidRate(f64),

    #[error("target rate {0} Hz rounds to a zero-millisecond period")]
    ZeroPeriod(f64),

    #[error("timestamp column '{0}' not found")]
    MissingTimeColumn(String),

    #[error("need at least 2 rows with a parsable timestamp, found {0}")]
    TooFewTimestamps(usize),

    #[error("no numeric columns to interpolate")]
    NoNumericColumns,

    #[error("timestamps span {span_ms} ms, more than {max} grid rows at {period_ms} ms")]
    GridTooLarge {
        span_ms: i128,
        period_ms: i64,
        max: usize,
    },
}

impl From<ResampleError> for cs_common::Error {
    fn from(err: ResampleError) -> Self {
        cs_common::Error::Resampling(err.to_string())
    }
}

/// A recording on a uniform time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSeries {
    /// Grid spacing in milliseconds.
    pub period_ms: i64,
    /// Interpolated numeric columns, one row per grid instant.
    /// The timestamp column itself is not included.
    pub table: RecordTable,
}

/// Grid spacing for a target rate, rounding half to even.
pub fn period_ms(target_hz: f64) -> Result<i64, ResampleError> {
    if !target_hz.is_finite() || target_hz <= 0.0 {
        return Err(ResampleError::InvalidRate(target_hz));
    }
    let period = (1000.0 / target_hz).round_ties_even();
    if period <= 0.0 {
        return Err(ResampleError::ZeroPeriod(target_hz));
    }
    // The grid steps in microseconds.
    if period >= (i64::MAX / 1000) as f64 {
        return Err(ResampleError::InvalidRate(target_hz));
    }
    Ok(period as i64)
}

/// Upper bound on the rows one resampled file may produce.
pub const MAX_GRID_ROWS: usize = 10_000_000;

/// Instants from `start` to `end` (inclusive when aligned) every `step` µs.
fn build_grid(start: i64, end: i64, step: i64) -> Result<Vec<i64>, ResampleError> {
    let span = i128::from(end) - i128::from(start);
    let count = span / i128::from(step) + 1;
    match usize::try_from(count) {
        // The span must also fit i64 so offsets from `start` stay exact.
        Ok(count) if count <= MAX_GRID_ROWS && span <= i128::from(i64::MAX) => {
            Ok((0..count as i64).map(|k| start + k * step).collect())
        }
        _ => Err(ResampleError::GridTooLarge {
            span_ms: span / 1000,
            period_ms: step / 1000,
            max: MAX_GRID_ROWS,
        }),
    }
}

/// Resample `table` onto a uniform grid at `target_hz`.
pub fn resample(
    table: &RecordTable,
    time_column: &str,
    target_hz: f64,
) -> Result<UniformSeries, ResampleError> {
    let period = period_ms(target_hz)?;
    let time_col = table
        .column(time_column)
        .ok_or_else(|| ResampleError::MissingTimeColumn(time_column.to_string()))?;

    // (instant, original row), unparsable rows dropped, then time-ordered.
    let mut rows: Vec<(i64, usize)> = parse_time_column(time_col)
        .into_iter()
        .enumerate()
        .filter_map(|(row, ts)| ts.map(|t| (t, row)))
        .collect();
    let dropped = table.n_rows() - rows.len();
    rows.sort_by_key(|&(t, _)| t);
    // Repeated instants keep their first row.
    rows.dedup_by_key(|&mut (t, _)| t);
    if rows.len() < 2 {
        return Err(ResampleError::TooFewTimestamps(rows.len()));
    }

    let numeric: Vec<(&str, &[f64])> = table
        .columns()
        .iter()
        .filter(|c| c.name != time_column)
        .filter_map(|c| match &c.data {
            ColumnData::Numeric(v) => Some((c.name.as_str(), v.as_slice())),
            ColumnData::Text(_) => None,
        })
        .collect();
    if numeric.is_empty() {
        return Err(ResampleError::NoNumericColumns);
    }

    let start = rows[0].0;
    let end = rows[rows.len() - 1].0;
    let grid = build_grid(start, end, period * 1000)?;

    // Offsets from the start keep f64 positions exact at microsecond scale.
    let xs: Vec<f64> = rows.iter().map(|&(t, _)| (t - start) as f64).collect();
    let gx: Vec<f64> = grid.iter().map(|&t| (t - start) as f64).collect();

    let columns = numeric
        .into_iter()
        .map(|(name, values)| {
            let ys: Vec<f64> = rows.iter().map(|&(_, row)| values[row]).collect();
            Column::numeric(name, interp_onto(&xs, &ys, &gx))
        })
        .collect();

    debug!(
        source_rows = table.n_rows(),
        dropped,
        grid_rows = grid.len(),
        period_ms = period,
        "resampled"
    );

    Ok(UniformSeries {
        table: RecordTable::from_parts(columns, grid.len()),
        period_ms: period,
    })
}
