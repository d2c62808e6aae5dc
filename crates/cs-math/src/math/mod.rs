//! Core math modules.

pub mod interp;
pub mod phase;
pub mod stats;
