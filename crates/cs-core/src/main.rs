//! citysafe: CSV-to-window pipeline and calibration sampling.

use clap::Parser;
use cs_core::cli::{self, Cli};
use cs_core::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_json);
    cli::run(&cli).into()
}
