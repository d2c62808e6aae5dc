//! Pipeline and sampler configuration types.
//!
//! Both sections of the config file are optional; missing keys fall back to
//! the defaults below.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default window length in rows.
pub const DEFAULT_SEQ_LEN: usize = 100;
/// Default distance between consecutive window starts.
pub const DEFAULT_STRIDE: usize = 50;
/// Default number of calibration samples drawn per request.
pub const DEFAULT_NUM_SAMPLES: usize = 100;
/// Default feature width of synthetic/aggregate calibration samples.
pub const DEFAULT_SAMPLER_FEATURES: usize = 10;

/// Complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigFile {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub sampler: SamplerConfig,
}

/// CSV-to-windows pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for `*.csv` recordings.
    pub input_dir: PathBuf,

    /// Root of the output layout (`rep_windows/`, `sample.npy`, `metadata.json`).
    pub out_dir: PathBuf,

    /// Rows per window.
    pub seq_len: usize,

    /// Rows between consecutive window starts.
    pub stride: usize,

    /// Feature columns to keep, in order. `None` selects every numeric column.
    pub features: Option<Vec<String>>,

    /// Uniform resampling rate. `None` disables resampling.
    pub target_hz: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("raw_csvs"),
            out_dir: PathBuf::from("data"),
            seq_len: DEFAULT_SEQ_LEN,
            stride: DEFAULT_STRIDE,
            features: None,
            target_hz: None,
        }
    }
}

impl PipelineConfig {
    /// Directory holding the per-window `.npy` files.
    pub fn windows_dir(&self) -> PathBuf {
        self.out_dir.join("rep_windows")
    }

    /// Path of the aggregate sample array.
    pub fn sample_path(&self) -> PathBuf {
        self.out_dir.join("sample.npy")
    }

    /// Path of the metadata document.
    pub fn metadata_path(&self) -> PathBuf {
        self.out_dir.join("metadata.json")
    }
}

/// Representative sampler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SamplerConfig {
    /// Number of draws per request.
    pub num_samples: usize,

    /// Rows per sample for the aggregate and synthetic sources.
    pub seq_len: usize,

    /// Feature width for the aggregate and synthetic sources.
    pub features: usize,

    /// Directory of precomputed windows (first choice).
    pub windows_dir: PathBuf,

    /// Aggregate sample array (second choice).
    pub sample_path: PathBuf,

    /// Fixed RNG seed for reproducible draws.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            seq_len: DEFAULT_SEQ_LEN,
            features: DEFAULT_SAMPLER_FEATURES,
            windows_dir: PathBuf::from("data/rep_windows"),
            sample_path: PathBuf::from("data/sample.npy"),
            seed: None,
        }
    }
}

/// Split a comma-separated feature list, trimming whitespace and dropping
/// empty entries.
pub fn parse_feature_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pipeline values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct PipelineOverrides {
    pub input_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub seq_len: Option<usize>,
    pub stride: Option<usize>,
    /// Comma-separated, as typed by the user.
    pub features: Option<String>,
    pub target_hz: Option<f64>,
}

impl PipelineOverrides {
    /// Apply every present override on top of `config`.
    pub fn apply(self, config: &mut PipelineConfig) {
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.out_dir {
            config.out_dir = dir;
        }
        if let Some(n) = self.seq_len {
            config.seq_len = n;
        }
        if let Some(n) = self.stride {
            config.stride = n;
        }
        if let Some(raw) = self.features {
            let list = parse_feature_list(&raw);
            config.features = if list.is_empty() { None } else { Some(list) };
        }
        if let Some(hz) = self.target_hz {
            config.target_hz = Some(hz);
        }
    }
}

/// Sampler values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct SamplerOverrides {
    pub num_samples: Option<usize>,
    pub seq_len: Option<usize>,
    pub features: Option<usize>,
    pub windows_dir: Option<PathBuf>,
    pub sample_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl SamplerOverrides {
    /// Apply every present override on top of `config`.
    pub fn apply(self, config: &mut SamplerConfig) {
        if let Some(n) = self.num_samples {
            config.num_samples = n;
        }
        if let Some(n) = self.seq_len {
            config.seq_len = n;
        }
        if let Some(n) = self.features {
            config.features = n;
        }
        if let Some(dir) = self.windows_dir {
            config.windows_dir = dir;
        }
        if let Some(path) = self.sample_path {
            config.sample_path = path;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}
