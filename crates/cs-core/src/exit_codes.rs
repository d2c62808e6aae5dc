//! Exit codes for the citysafe CLI.
//!
//! Exit codes communicate the outcome of a command without requiring output
//! parsing. They are stable.

use cs_common::Error;

/// Exit codes for citysafe commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed, every input used
    Clean = 0,

    /// Run completed but some input files were skipped
    Partial = 3,

    /// No input files to process
    NoInput = 5,

    /// Configuration or argument error
    ConfigError = 10,

    /// Input data could not be used
    DataError = 11,

    /// I/O or storage error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a command that failed with `err`.
    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::Config(_) => ExitCode::ConfigError,
            Error::NoInput { .. } => ExitCode::NoInput,
            Error::Io(_) | Error::Json(_) | Error::NpyWrite(_) => ExitCode::IoError,
            e if e.is_recoverable() => ExitCode::DataError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}
