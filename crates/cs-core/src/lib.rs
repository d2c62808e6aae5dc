//! CitySafeSense sensor pipeline core.
//!
//! Raw CSV recordings are resampled onto a uniform grid, cut into
//! fixed-length standardized windows, persisted as `.npy` and stacked into
//! an aggregate sample. The representative sampler turns those artifacts
//! (or noise, when there are none) into calibration tensors for
//! post-training quantization.

pub mod aggregate;
pub mod cli;
pub mod exit_codes;
pub mod ingest;
pub mod inspect;
pub mod logging;
pub mod pipeline;
pub mod representative;
pub mod resample;
pub mod store;
pub mod synth;
pub mod window;

pub use aggregate::{stack_windows, write_aggregate};
pub use exit_codes::ExitCode;
pub use ingest::{read_csv, RecordTable};
pub use pipeline::{run, FileReport, FileStatus, RunSummary};
pub use representative::{RepresentativeSampler, SampleSource, SourceKind};
pub use resample::{resample, ResampleError, UniformSeries};
pub use window::{WindowMetadata, WindowingEngine};
