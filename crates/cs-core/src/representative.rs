//! Representative calibration samples for post-training quantization.
//!
//! The sampler picks one source per request and never mixes sources within
//! one stream:
//!
//! 1. a directory of precomputed windows holding at least one loadable file,
//! 2. the aggregate sample array, if it has at least `seq_len` rows,
//! 3. i.i.d. standard normal noise.
//!
//! Every yielded tensor has shape `(1, rows, features)` and is standardized
//! per column like a window.

use crate::store;
use cs_common::{Error, Result};
use cs_config::SamplerConfig;
use cs_math::standardize_columns;
use ndarray::{concatenate, s, Array2, Array3, ArrayView3, Axis};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where calibration samples are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleSource {
    /// Window files to draw from, with replacement.
    Windows(Vec<PathBuf>),
    /// Aggregate array already padded or truncated to the configured width.
    Aggregate(Array2<f32>),
    Synthetic,
}

impl SampleSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            SampleSource::Windows(_) => SourceKind::Windows,
            SampleSource::Aggregate(_) => SourceKind::Aggregate,
            SampleSource::Synthetic => SourceKind::Synthetic,
        }
    }
}

/// Label of a [`SampleSource`], for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Windows,
    Aggregate,
    Synthetic,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Windows => write!(f, "windows"),
            SourceKind::Aggregate => write!(f, "aggregate"),
            SourceKind::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Chooses a sample source and produces calibration streams from it.
#[derive(Debug, Clone)]
pub struct RepresentativeSampler {
    config: SamplerConfig,
}

impl RepresentativeSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Resolve the source for one request.
    pub fn select_source(&self) -> SampleSource {
        match self.window_files() {
            Some(files) => {
                info!(
                    dir = %self.config.windows_dir.display(),
                    files = files.len(),
                    "sampling from window files"
                );
                return SampleSource::Windows(files);
            }
            None => debug!(
                dir = %self.config.windows_dir.display(),
                "no loadable windows"
            ),
        }

        if let Some(data) = self.aggregate() {
            info!(
                path = %self.config.sample_path.display(),
                rows = data.nrows(),
                "sampling from aggregate"
            );
            return SampleSource::Aggregate(data);
        }

        info!(
            seq_len = self.config.seq_len,
            features = self.config.features,
            "sampling synthetic noise"
        );
        SampleSource::Synthetic
    }

    /// Every `.npy` file in the windows directory, provided at least one of
    /// them loads.
    fn window_files(&self) -> Option<Vec<PathBuf>> {
        let files = match store::list_npy_files(&self.config.windows_dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(dir = %self.config.windows_dir.display(), error = %e, "cannot list windows");
                return None;
            }
        };
        let loadable = files.iter().any(|path| match store::read_matrix(path) {
            Ok(_) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "window not loadable");
                false
            }
        });
        loadable.then_some(files)
    }

    /// The aggregate array with its columns fitted to `features`, if it
    /// exists and has enough rows.
    fn aggregate(&self) -> Option<Array2<f32>> {
        let path = &self.config.sample_path;
        if !path.exists() {
            return None;
        }
        let data = match store::read_matrix(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "aggregate not loadable");
                return None;
            }
        };
        if data.nrows() < self.config.seq_len {
            info!(
                rows = data.nrows(),
                seq_len = self.config.seq_len,
                "aggregate shorter than one window"
            );
            return None;
        }
        Some(fit_columns(data, self.config.features))
    }

    /// Stream of at most `num_samples` tensors from the selected source.
    pub fn samples<R: Rng>(&self, rng: R) -> RepresentativeSamples<R> {
        RepresentativeSamples {
            source: self.select_source(),
            rng,
            remaining: self.config.num_samples,
            seq_len: self.config.seq_len,
            features: self.config.features,
            skipped: 0,
        }
    }
}

/// Zero-pad or truncate columns to exactly `features`, keeping the leftmost.
pub fn fit_columns(data: Array2<f32>, features: usize) -> Array2<f32> {
    let (rows, cols) = data.dim();
    if cols == features {
        return data;
    }
    let mut out = Array2::<f32>::zeros((rows, features));
    let keep = cols.min(features);
    out.slice_mut(s![.., ..keep])
        .assign(&data.slice(s![.., ..keep]));
    out
}

/// Iterator over calibration tensors of shape `(1, rows, features)`.
pub struct RepresentativeSamples<R> {
    source: SampleSource,
    rng: R,
    remaining: usize,
    seq_len: usize,
    features: usize,
    skipped: usize,
}

impl<R: Rng> RepresentativeSamples<R> {
    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Draws lost to files that failed to load.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn draw(&mut self) -> Option<Array2<f32>> {
        let drawn = match &self.source {
            SampleSource::Windows(files) => {
                let path = &files[self.rng.random_range(0..files.len())];
                match store::read_matrix(path) {
                    Ok(window) => Some(window),
                    Err(e) => {
                        let err = Error::Load {
                            path: path.clone(),
                            reason: e.to_string(),
                        };
                        warn!(code = err.code(), error = %err, "draw skipped");
                        self.skipped += 1;
                        None
                    }
                }
            }
            SampleSource::Aggregate(data) => {
                let start = self.rng.random_range(0..=data.nrows() - self.seq_len);
                Some(data.slice(s![start..start + self.seq_len, ..]).to_owned())
            }
            // Noise is yielded as drawn.
            SampleSource::Synthetic => {
                let rng = &mut self.rng;
                return Some(Array2::from_shape_simple_fn(
                    (self.seq_len, self.features),
                    || rng.sample::<f32, _>(StandardNormal),
                ));
            }
        };
        drawn.map(|mut window| {
            standardize_columns(&mut window);
            window
        })
    }
}

impl<R: Rng> Iterator for RepresentativeSamples<R> {
    type Item = Array3<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            self.remaining -= 1;
            if let Some(window) = self.draw() {
                return Some(window.insert_axis(Axis(0)));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Stack `(1, rows, features)` samples into `(n, rows, features)`.
///
/// Returns `Ok(None)` when there are no samples.
pub fn stack_samples(samples: &[Array3<f32>]) -> Result<Option<Array3<f32>>> {
    let Some(first) = samples.first() else {
        return Ok(None);
    };
    let views: Vec<ArrayView3<'_, f32>> = samples.iter().map(|a| a.view()).collect();
    concatenate(Axis(0), &views)
        .map(Some)
        .map_err(|e| Error::InvalidShape {
            expected: format!("samples shaped like {:?} ({e})", first.shape()),
            actual: samples
                .iter()
                .find(|a| a.shape() != first.shape())
                .map(|a| a.shape().to_vec())
                .unwrap_or_default(),
        })
}
