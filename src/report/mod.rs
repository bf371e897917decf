//! Reporting utilities: run summaries and the monthly table.

pub mod format;

pub use format::*;
