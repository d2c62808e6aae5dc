//! Command-line surface of the `citysafe` binary.
//!
//! Every command resolves configuration the same way (defaults, config file,
//! `CITYSAFE_*` environment, flags), renders its result as text or JSON on
//! stdout and maps the outcome to an [`ExitCode`].

use crate::exit_codes::ExitCode;
use crate::inspect;
use crate::pipeline::{self, FileStatus, RunSummary};
use crate::representative::{stack_samples, RepresentativeSampler, SourceKind};
use crate::store;
use crate::synth::{self, SYNTH_FEATURES};
use crate::window::WindowMetadata;
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cs_common::{Error, OutputFormat, Result, SCHEMA_VERSION};
use cs_config::{
    resolve_config, ConfigError, ConfigFile, ConfigPaths, ConfigSnapshot, PipelineOverrides,
    ResolvedConfig, SamplerOverrides,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CitySafeSense sensor pipeline
#[derive(Parser, Debug)]
#[command(name = "citysafe", version, about)]
pub struct Cli {
    /// Config file (TOML, or JSON by extension)
    #[arg(long, global = true, env = "CITYSAFE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Result format on stdout
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Human,
        env = "CITYSAFE_FORMAT"
    )]
    pub format: OutputFormat,

    /// Log filter (overrides RUST_LOG)
    #[arg(long, global = true, env = "CITYSAFE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert CSV recordings into normalized windows, sample.npy and metadata.json
    Windows(WindowsArgs),
    /// Draw representative calibration samples and save them stacked
    Calibrate(CalibrateArgs),
    /// Generate a synthetic activity trace as .npy
    Synth(SynthArgs),
    /// Write a CSV recording with irregular timestamps
    GenCsv(GenCsvArgs),
    /// Print shape and per-feature statistics of a window
    Inspect(InspectArgs),
    /// Print a JSON Schema
    Schema(SchemaArgs),
}

#[derive(Args, Debug, Default)]
pub struct WindowsArgs {
    /// Directory of input CSV files
    #[arg(long, env = "CITYSAFE_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Output root
    #[arg(long, env = "CITYSAFE_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Rows per window
    #[arg(long, env = "CITYSAFE_SEQ_LEN")]
    pub seq_len: Option<usize>,

    /// Rows between window starts
    #[arg(long, env = "CITYSAFE_STRIDE")]
    pub stride: Option<usize>,

    /// Comma-separated feature columns, e.g. ax,ay,az,gx,gy,gz,speed
    #[arg(long, env = "CITYSAFE_FEATURES")]
    pub features: Option<String>,

    /// Resample timestamped recordings to this rate
    #[arg(long, env = "CITYSAFE_TARGET_HZ")]
    pub target_hz: Option<f64>,
}

impl WindowsArgs {
    pub fn overrides(&self) -> PipelineOverrides {
        PipelineOverrides {
            input_dir: self.input_dir.clone(),
            out_dir: self.out_dir.clone(),
            seq_len: self.seq_len,
            stride: self.stride,
            features: self.features.clone(),
            target_hz: self.target_hz,
        }
    }
}

#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Number of draws
    #[arg(long, env = "CITYSAFE_NUM_SAMPLES")]
    pub num_samples: Option<usize>,

    /// Rows per aggregate or synthetic sample
    #[arg(long, env = "CITYSAFE_SAMPLER_SEQ_LEN")]
    pub seq_len: Option<usize>,

    /// Feature width of aggregate or synthetic samples
    #[arg(long, env = "CITYSAFE_SAMPLER_FEATURES")]
    pub features: Option<usize>,

    /// Precomputed windows directory
    #[arg(long, env = "CITYSAFE_WINDOWS_DIR")]
    pub windows_dir: Option<PathBuf>,

    /// Aggregate sample array
    #[arg(long, env = "CITYSAFE_SAMPLE_PATH")]
    pub sample_path: Option<PathBuf>,

    /// RNG seed for reproducible draws
    #[arg(long, env = "CITYSAFE_SEED")]
    pub seed: Option<u64>,

    /// Output file for the stacked samples
    #[arg(long, default_value = "data/calibration.npy")]
    pub out: PathBuf,
}

impl CalibrateArgs {
    pub fn overrides(&self) -> SamplerOverrides {
        SamplerOverrides {
            num_samples: self.num_samples,
            seq_len: self.seq_len,
            features: self.features,
            windows_dir: self.windows_dir.clone(),
            sample_path: self.sample_path.clone(),
            seed: self.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    #[arg(long, default_value = "data/synthetic.npy")]
    pub out: PathBuf,

    /// Trace length in seconds
    #[arg(long, default_value_t = 60.0)]
    pub duration: f64,

    /// Sampling rate in Hz
    #[arg(long, default_value_t = 50.0)]
    pub fs: f64,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct GenCsvArgs {
    #[arg(long, default_value = "raw_csvs/test_demo.csv")]
    pub out: PathBuf,

    /// Number of rows
    #[arg(long, default_value_t = 600)]
    pub n: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Window file; defaults to the first file in --dir
    pub path: Option<PathBuf>,

    #[arg(long, default_value = "data/rep_windows")]
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaTarget::Config)]
    pub target: SchemaTarget,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    /// Config file layout
    Config,
    /// metadata.json layout
    Metadata,
}

/// JSON wrapper shared by every command result.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    generated_at: String,
    command: &'a str,
    result: T,
}

#[derive(Serialize)]
struct ErrorBody {
    code: u32,
    message: String,
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> ExitCode {
    let format = cli.format;
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Windows(args) => run_windows(format, config, args),
        Commands::Calibrate(args) => run_calibrate(format, config, args),
        Commands::Synth(args) => run_synth(format, args),
        Commands::GenCsv(args) => run_gen_csv(format, args),
        Commands::Inspect(args) => run_inspect(format, args),
        Commands::Schema(args) => run_schema(args),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let resolved = resolve_config(&ConfigPaths::new(explicit.map(Path::to_path_buf)))?;
    info!(source = %resolved.source, "configuration resolved");
    Ok(resolved)
}

fn print_json<T: Serialize>(command: &str, result: T) -> ExitCode {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        command,
        result,
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(e) => {
            error!(error = %e, "failed to render result");
            ExitCode::InternalError
        }
    }
}

fn report_error(format: OutputFormat, command: &str, err: &Error) -> ExitCode {
    let code = ExitCode::for_error(err);
    error!(command, code = err.code(), error = %err, "command failed");
    match format {
        OutputFormat::Json => {
            print_json(
                command,
                ErrorBody {
                    code: err.code(),
                    message: err.to_string(),
                },
            );
        }
        OutputFormat::Human => eprintln!("error: {err}"),
    }
    code
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

// ---------------------------------------------------------------------------
// windows
// ---------------------------------------------------------------------------

fn run_windows(format: OutputFormat, config: Option<&Path>, args: &WindowsArgs) -> ExitCode {
    match windows_inner(config, args) {
        Ok(summary) => {
            let code = if summary.is_partial() {
                ExitCode::Partial
            } else {
                ExitCode::Clean
            };
            match format {
                OutputFormat::Json => {
                    let rendered = print_json("windows", &summary);
                    if rendered != ExitCode::Clean {
                        return rendered;
                    }
                }
                OutputFormat::Human => print_run_summary(&summary),
            }
            code
        }
        Err(e) => report_error(format, "windows", &e),
    }
}

fn windows_inner(config: Option<&Path>, args: &WindowsArgs) -> Result<RunSummary> {
    let ResolvedConfig { mut config, source } = load_config(config)?;
    args.overrides().apply(&mut config.pipeline);
    config
        .pipeline
        .validate()
        .map_err(|e| Error::from(ConfigError::from(e)))?;
    let snapshot = ConfigSnapshot::capture(&config, &source)?;
    Ok(pipeline::run(&config.pipeline)?.with_config_hash(snapshot.sha256))
}

fn print_run_summary(summary: &RunSummary) {
    println!("# Run {}", summary.run_id);
    println!();
    for report in &summary.files {
        match &report.status {
            FileStatus::Windowed { windows, resampled } => println!(
                "  ok    {} windows={}{}",
                report.path.display(),
                windows,
                if *resampled { " (resampled)" } else { "" }
            ),
            FileStatus::Skipped { code, reason } => {
                println!("  skip  {} [{}] {}", report.path.display(), code, reason)
            }
        }
    }
    println!();
    println!("  windows written: {}", summary.windows_written);
    match summary.sample_rows {
        Some(rows) => println!("  sample rows:     {rows}"),
        None => println!("  sample rows:     (not written)"),
    }
    println!("  metadata:        {}", summary.metadata_path.display());
    if let Some(hash) = &summary.config_hash {
        println!("  config sha256:   {hash}");
    }
}

// ---------------------------------------------------------------------------
// calibrate
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CalibrationReport {
    source: SourceKind,
    drawn: usize,
    skipped: usize,
    shape: Option<Vec<usize>>,
    out: Option<PathBuf>,
}

fn run_calibrate(format: OutputFormat, config: Option<&Path>, args: &CalibrateArgs) -> ExitCode {
    match calibrate_inner(config, args) {
        Ok(report) => match format {
            OutputFormat::Json => print_json("calibrate", &report),
            OutputFormat::Human => {
                println!("source:  {}", report.source);
                println!("drawn:   {} (skipped {})", report.drawn, report.skipped);
                match (&report.shape, &report.out) {
                    (Some(shape), Some(out)) => println!("saved:   {} {:?}", out.display(), shape),
                    _ => println!("saved:   nothing"),
                }
                ExitCode::Clean
            }
        },
        Err(e) => report_error(format, "calibrate", &e),
    }
}

fn calibrate_inner(config: Option<&Path>, args: &CalibrateArgs) -> Result<CalibrationReport> {
    let ResolvedConfig { mut config, .. } = load_config(config)?;
    args.overrides().apply(&mut config.sampler);
    config
        .sampler
        .validate()
        .map_err(|e| Error::from(ConfigError::from(e)))?;

    let rng = seeded_rng(config.sampler.seed);
    let sampler = RepresentativeSampler::new(config.sampler);
    let mut stream = sampler.samples(rng);
    let source = stream.source_kind();
    let samples: Vec<_> = stream.by_ref().collect();
    let skipped = stream.skipped();

    let (shape, out) = match stack_samples(&samples)? {
        Some(stacked) => {
            ensure_parent(&args.out)?;
            store::write_array(&args.out, &stacked)?;
            info!(out = %args.out.display(), shape = ?stacked.shape(), "calibration samples saved");
            (Some(stacked.shape().to_vec()), Some(args.out.clone()))
        }
        None => (None, None),
    };
    Ok(CalibrationReport {
        source,
        drawn: samples.len(),
        skipped,
        shape,
        out,
    })
}

// ---------------------------------------------------------------------------
// synth / gen-csv
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SynthReport<'a> {
    out: &'a Path,
    shape: [usize; 2],
    features: [&'static str; 9],
}

fn run_synth(format: OutputFormat, args: &SynthArgs) -> ExitCode {
    let mut rng = seeded_rng(args.seed);
    let data = match synth::generate_sequence(args.duration, args.fs, &mut rng) {
        Ok(data) => data,
        Err(e) => return report_error(format, "synth", &e),
    };
    let saved = ensure_parent(&args.out).and_then(|_| store::write_array(&args.out, &data));
    if let Err(e) = saved {
        return report_error(format, "synth", &e);
    }
    let report = SynthReport {
        out: &args.out,
        shape: [data.nrows(), data.ncols()],
        features: SYNTH_FEATURES,
    };
    match format {
        OutputFormat::Json => print_json("synth", &report),
        OutputFormat::Human => {
            println!(
                "Saved synthetic data {:?} to {}",
                report.shape,
                args.out.display()
            );
            ExitCode::Clean
        }
    }
}

#[derive(Debug, Serialize)]
struct GenCsvReport<'a> {
    out: &'a Path,
    rows: usize,
}

fn run_gen_csv(format: OutputFormat, args: &GenCsvArgs) -> ExitCode {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let start = Utc::now().naive_utc();
    if let Err(e) = synth::write_jittered_csv(&args.out, args.n, start, &mut rng) {
        return report_error(format, "gen-csv", &e);
    }
    match format {
        OutputFormat::Json => print_json(
            "gen-csv",
            GenCsvReport {
                out: &args.out,
                rows: args.n,
            },
        ),
        OutputFormat::Human => {
            println!("Wrote test CSV to {}", args.out.display());
            ExitCode::Clean
        }
    }
}

// ---------------------------------------------------------------------------
// inspect / schema
// ---------------------------------------------------------------------------

fn run_inspect(format: OutputFormat, args: &InspectArgs) -> ExitCode {
    let path = match &args.path {
        Some(path) => path.clone(),
        None => match inspect::first_window(&args.dir) {
            Ok(Some(path)) => path,
            Ok(None) => {
                eprintln!("No windows found in {}", args.dir.display());
                return ExitCode::NoInput;
            }
            Err(e) => return report_error(format, "inspect", &e),
        },
    };
    match inspect::summarize(&path) {
        Ok(summary) => match format {
            OutputFormat::Json => print_json("inspect", &summary),
            OutputFormat::Human => {
                print!("{summary}");
                ExitCode::Clean
            }
        },
        Err(e) => report_error(format, "inspect", &e),
    }
}

fn run_schema(args: &SchemaArgs) -> ExitCode {
    let schema = match args.target {
        SchemaTarget::Config => schemars::schema_for!(ConfigFile),
        SchemaTarget::Metadata => schemars::schema_for!(Vec<WindowMetadata>),
    };
    match serde_json::to_string_pretty(&schema) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(e) => {
            error!(error = %e, "failed to render schema");
            ExitCode::InternalError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn windows_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "citysafe",
            "windows",
            "--seq-len",
            "64",
            "--features",
            "ax,ay",
            "--target-hz",
            "50",
        ])
        .unwrap();
        let Commands::Windows(args) = cli.command else {
            panic!("expected windows command");
        };
        let mut cfg = cs_config::PipelineConfig::default();
        args.overrides().apply(&mut cfg);
        assert_eq!(cfg.seq_len, 64);
        assert_eq!(cfg.stride, 50);
        assert_eq!(cfg.features, Some(vec!["ax".into(), "ay".into()]));
        assert_eq!(cfg.target_hz, Some(50.0));
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["citysafe", "schema", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
