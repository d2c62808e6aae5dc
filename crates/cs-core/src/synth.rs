//! Synthetic sensor data for demos and tests.
//!
//! [`generate_sequence`] builds an unlabelled activity trace made of walk,
//! drive and mugging segments. [`write_jittered_csv`] writes a raw recording
//! with irregular timestamps, the kind of input the resampler exists for.

use chrono::{NaiveDateTime, TimeDelta};
use cs_common::{Error, Result};
use cs_math::{unwrap_phase, wrap_phase};
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;
use std::path::Path;
use tracing::debug;

/// Column names of [`generate_sequence`] output, in order.
pub const SYNTH_FEATURES: [&str; 9] = [
    "accel_x",
    "accel_y",
    "accel_z",
    "gyro_x",
    "gyro_y",
    "gyro_z",
    "speed",
    "heading",
    "acoustic",
];

/// Header of [`write_jittered_csv`] output.
pub const CSV_COLUMNS: [&str; 8] = ["timestamp", "ax", "ay", "az", "gx", "gy", "gz", "speed"];

/// Timestamp layout written to generated CSVs.
pub const CSV_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Activity simulated by one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Walk,
    Drive,
    Mugging,
}

impl SegmentKind {
    const ALL: [SegmentKind; 3] = [SegmentKind::Walk, SegmentKind::Drive, SegmentKind::Mugging];
    const WEIGHTS: [u32; 3] = [7, 2, 1];
}

fn gauss<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// `(len, 9)` samples of one activity at `fs` Hz.
pub fn simulate_segment<R: Rng + ?Sized>(
    kind: SegmentKind,
    len: usize,
    fs: f64,
    rng: &mut R,
) -> Array2<f32> {
    let span = len as f64 / fs;
    let step = if len > 1 { span / (len - 1) as f64 } else { 0.0 };

    let mut accel = Vec::with_capacity(len);
    let mut gyro = Vec::with_capacity(len);
    let mut speed = Vec::with_capacity(len);
    let mut acoustic = Vec::with_capacity(len);
    for i in 0..len {
        let t = i as f64 * step;
        let (a, g, s, ac) = match kind {
            SegmentKind::Walk => (
                0.5 * (2.0 * PI * 1.5 * t).sin() + 0.05 * gauss(rng),
                0.1 * (2.0 * PI * 0.5 * t).sin() + 0.02 * gauss(rng),
                1.3 + 0.1 * gauss(rng),
                0.01 * gauss(rng),
            ),
            SegmentKind::Drive => (
                0.1 * gauss(rng),
                0.05 * gauss(rng),
                8.0 + 0.5 * gauss(rng),
                0.005 * gauss(rng),
            ),
            SegmentKind::Mugging => (
                2.0 * (-5.0 * t).exp() + 0.3 * gauss(rng),
                (-3.0 * t).exp() + 0.1 * gauss(rng),
                0.2 * gauss(rng),
                (if t < 0.05 { 0.5 } else { 0.0 }) + 0.1 * gauss(rng),
            ),
        };
        accel.push(a);
        gyro.push(g);
        speed.push(s);
        acoustic.push(ac);
    }

    let wrapped: Vec<f64> = speed.iter().map(|&s| wrap_phase(s)).collect();
    let heading = unwrap_phase(&wrapped);

    let mut out = Array2::<f32>::zeros((len, SYNTH_FEATURES.len()));
    for i in 0..len {
        let row = [
            accel[i],
            accel[i] * 0.9 + 0.01 * gauss(rng),
            accel[i] * 1.1 + 0.01 * gauss(rng),
            gyro[i],
            gyro[i] * 0.95 + 0.005 * gauss(rng),
            gyro[i] * 1.05 + 0.005 * gauss(rng),
            speed[i],
            heading[i],
            acoustic[i],
        ];
        for (j, v) in row.into_iter().enumerate() {
            out[[i, j]] = v as f32;
        }
    }
    out
}

/// Longest trace [`generate_sequence`] will build.
pub const MAX_SYNTH_ROWS: usize = 10_000_000;

/// Rows needed to cover `duration_s` seconds at `fs` Hz.
pub fn trace_rows(duration_s: f64, fs: f64) -> Result<usize> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(Error::Config(format!(
            "fs: must be positive and finite, got {fs}"
        )));
    }
    if !duration_s.is_finite() || duration_s <= 0.0 {
        return Err(Error::Config(format!(
            "duration: must be positive and finite, got {duration_s}"
        )));
    }
    let rows = (duration_s * fs).ceil();
    if rows > MAX_SYNTH_ROWS as f64 {
        return Err(Error::Config(format!(
            "duration * fs: {rows} rows exceeds the limit of {MAX_SYNTH_ROWS}"
        )));
    }
    Ok(rows as usize)
}

/// A trace covering `duration_s` seconds at `fs` Hz, built from random
/// segments of 50 to 199 samples. The last segment is cut to fit.
pub fn generate_sequence<R: Rng + ?Sized>(
    duration_s: f64,
    fs: f64,
    rng: &mut R,
) -> Result<Array2<f32>> {
    let target = trace_rows(duration_s, fs)?;
    let kinds = WeightedIndex::new(SegmentKind::WEIGHTS).ok();
    let mut segments = Vec::new();
    let mut produced = 0;
    while produced < target {
        let kind = match &kinds {
            Some(dist) => SegmentKind::ALL[dist.sample(rng)],
            None => SegmentKind::Walk,
        };
        let len = (target - produced).min(rng.random_range(50..200));
        debug!(?kind, len, "synthetic segment");
        segments.push(simulate_segment(kind, len, fs, rng));
        produced += len;
    }
    let views: Vec<ArrayView2<'_, f32>> = segments.iter().map(|s| s.view()).collect();
    concatenate(Axis(0), &views).map_err(|e| Error::InvalidShape {
        expected: format!("contiguous synthetic segments ({e})"),
        actual: vec![target, SYNTH_FEATURES.len()],
    })
}

/// Write `n` rows with timestamps advancing by 15 to 30 ms from `start`.
pub fn write_jittered_csv<R: Rng + ?Sized>(
    path: &Path,
    n: usize,
    start: NaiveDateTime,
    rng: &mut R,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(CSV_COLUMNS)?;

    let mut t = start;
    for _ in 0..n {
        t += TimeDelta::milliseconds(rng.random_range(15..=30));
        let mut record = vec![t.format(CSV_TIME_FORMAT).to_string()];
        for _ in 0..6 {
            record.push(gauss(rng).to_string());
        }
        record.push((gauss(rng).abs() * 1.2).to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), rows = n, "jittered csv written");
    Ok(())
}
