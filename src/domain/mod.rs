//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration (`PipelineConfig`, `SegmentRange`, `RoundingMode`, `ColumnMapping`)
//! - record shapes along the ingest pass (`RawRecord` -> `NormalizedRecord` -> `CleanRecord`)
//! - the aggregated series (`Period`, `MonthlyBucket`, `MonthlySeries`)
//! - derived views (`TrendSegment`, `SmoothCurve`, `Extrema`)

pub mod types;

pub use types::*;
