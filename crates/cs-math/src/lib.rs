//! CitySafeSense math utilities.

pub mod math;

pub use math::interp::*;
pub use math::phase::*;
pub use math::stats::*;
