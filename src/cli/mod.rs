//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numeric pipeline. Every option can also come from the environment (or a
//! `.env` file), which is loaded before parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{BYTES_PER_TB, DEFAULT_DATE_COLUMN, DEFAULT_SIZE_COLUMN, Period, RoundingMode, SegmentRange};
use crate::smooth::DEFAULT_SMOOTH_POINTS;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "archive-trend",
    version,
    about = "Aggregate archived data per month and fit piecewise trend lines"
)]
pub struct Cli {
    /// CSV file containing the archived data.
    #[arg(env = "ARCHIVE_TREND_CSV", default_value = "Data-ingested-over-time.csv")]
    pub file_path: PathBuf,

    /// Enable debug logging and report the total archived data.
    #[arg(long)]
    pub debug: bool,

    /// Load the pipeline configuration from a JSON file instead of the flags below.
    #[arg(long, env = "ARCHIVE_TREND_CONFIG", value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Name of the timestamp column.
    #[arg(long, env = "ARCHIVE_TREND_DATE_COLUMN", default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// Name of the size column.
    #[arg(long, env = "ARCHIVE_TREND_SIZE_COLUMN", default_value = DEFAULT_SIZE_COLUMN)]
    pub size_column: String,

    /// Bytes per output unit (default: 1024^4, i.e. TB).
    #[arg(long, env = "ARCHIVE_TREND_UNIT_DIVISOR", default_value_t = BYTES_PER_TB)]
    pub unit_divisor: f64,

    /// Rounding applied when converting monthly totals to whole units.
    #[arg(long, value_enum, env = "ARCHIVE_TREND_ROUNDING", default_value_t = RoundingMode::HalfEven)]
    pub rounding: RoundingMode,

    /// Trend segment as START:END (YYYY-MM). END may be empty or `last`. Repeatable.
    ///
    /// Defaults to 2008-10:2017-10 and 2018-06:last.
    #[arg(long = "segment", value_name = "START:END")]
    pub segments: Vec<SegmentRange>,

    /// Chain each segment to the previous one, starting this many units below its end.
    #[arg(long, env = "ARCHIVE_TREND_CONTINUITY_GAP", allow_negative_numbers = true)]
    pub continuity_gap: Option<f64>,

    /// Report the largest month before and from this period (YYYY-MM).
    #[arg(long, env = "ARCHIVE_TREND_BREAKPOINT", value_name = "YYYY-MM")]
    pub breakpoint: Option<Period>,

    /// Produce a spline-smoothed curve.
    #[arg(long)]
    pub smooth: bool,

    /// Number of samples in the smoothed curve.
    #[arg(long, default_value_t = DEFAULT_SMOOTH_POINTS)]
    pub smooth_points: usize,

    /// Compute trend, smoothing and extrema on parallel threads.
    #[arg(long)]
    pub parallel: bool,

    /// Print the monthly table before the summary.
    #[arg(long)]
    pub series: bool,

    /// Export the results (series, segments, curve, extrema) to JSON.
    #[arg(long = "export-json", value_name = "FILE")]
    pub export_json: Option<PathBuf>,

    /// Export the monthly series with segment overlays to CSV.
    #[arg(long = "export-csv", value_name = "FILE")]
    pub export_csv: Option<PathBuf>,

    /// Write a markdown debug bundle under `debug/`.
    #[arg(long)]
    pub debug_bundle: bool,
}
