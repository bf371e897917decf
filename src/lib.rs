//! `archive-trend` library crate.
//!
//! Turns an archive-growth CSV export into a monthly series and the views a
//! chart is drawn from: piecewise trend lines, a smoothed curve, and extrema
//! around a breakpoint.
//!
//! The binary (`archive-trend`) is a thin wrapper around this library so that
//! every stage is testable without spawning processes.

pub mod annotate;
pub mod app;
pub mod cli;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod ingest;
pub mod io;
pub mod math;
pub mod report;
pub mod series;
pub mod smooth;
