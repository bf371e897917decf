//! Piecewise trend fitting.
//!
//! Responsibilities:
//!
//! - select the bucket run for a period range and fit an OLS line over it (`segment`)
//! - fit a list of ranges, optionally chaining them with a continuity offset (`continuity`)

pub mod continuity;
pub mod segment;

pub use continuity::*;
pub use segment::*;
