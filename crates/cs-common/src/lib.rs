//! CitySafeSense common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the pipeline crates:
//! - The pipeline error taxonomy with stable error codes
//! - Run identifiers
//! - Schema versioning for persisted documents
//! - Output format selection

pub mod error;
pub mod id;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::RunId;
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
