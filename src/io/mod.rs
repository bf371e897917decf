//! Input/output helpers.
//!
//! - CSV reading of the archive export (`ingest`)
//! - series CSV export for spreadsheets (`export`)
//! - results JSON read/write for chart renderers (`results`)

pub mod export;
pub mod ingest;
pub mod results;

pub use export::*;
pub use ingest::*;
pub use results::*;
