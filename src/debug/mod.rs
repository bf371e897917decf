//! Diagnostics and the debug bundle writer.
//!
//! Diagnostics are a few run-level numbers that are useful when checking an
//! input file but play no part in the fits. The debug bundle is a markdown
//! snapshot of a run (counts, monthly table, segment parameters) written under
//! `debug/` for later inspection.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::pipeline::RunOutput;
use crate::domain::MonthlySeries;
use crate::error::AppError;
use crate::ingest::CleanseStats;

/// Factor between the output unit and the next larger one (TB -> PB).
pub const LARGER_UNIT_FACTOR: f64 = 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub rows_read: usize,
    pub rows_dropped_invalid: usize,
    pub rows_dropped_zero: usize,
    pub months: usize,
    /// Sum of every bucket's `total_unit`.
    pub total_units: i64,
    /// `total_units / 1024`.
    pub total_larger_units: f64,
}

pub fn compute_diagnostics(series: &MonthlySeries, stats: &CleanseStats) -> Diagnostics {
    let total_units = series.total_units();
    let diagnostics = Diagnostics {
        rows_read: stats.rows_read,
        rows_dropped_invalid: stats.dropped_invalid,
        rows_dropped_zero: stats.dropped_zero,
        months: series.len(),
        total_units,
        total_larger_units: total_units as f64 / LARGER_UNIT_FACTOR,
    };
    info!(
        total_units = diagnostics.total_units,
        total_larger_units = diagnostics.total_larger_units,
        "total archived data"
    );
    diagnostics
}

/// Write a markdown bundle for `run` into `dir` and return its path.
pub fn write_debug_bundle(dir: &Path, input: &Path, run: &RunOutput) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("archive_trend_debug_{ts}.md"));

    let body = render_bundle(input, run);
    let mut file = File::create(&path).map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn render_bundle(input: &Path, run: &RunOutput) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    let stats = &run.ingest_stats;

    let _ = writeln!(out, "# archive-trend debug bundle");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(out, "- input: {}", input.display());
    let _ = writeln!(
        out,
        "- rows: read={} used={} dropped_invalid={} dropped_zero={}",
        stats.rows_read,
        stats.rows_used(),
        stats.dropped_invalid,
        stats.dropped_zero
    );
    let _ = writeln!(
        out,
        "- unit_divisor: {} | rounding: {:?}",
        run.series.unit_divisor(),
        run.series.rounding_mode()
    );

    let _ = writeln!(out, "\n## Monthly series");
    let _ = writeln!(out, "| ordinal | period | total_bytes | total_unit |");
    let _ = writeln!(out, "| - | - | - | - |");
    for (ordinal, b) in run.series.buckets().iter().enumerate() {
        let _ = writeln!(out, "| {ordinal} | {} | {:.0} | {} |", b.period, b.total_bytes, b.total_unit);
    }

    let _ = writeln!(out, "\n## Segments");
    for outcome in &run.segments {
        match &outcome.result {
            Ok(s) => {
                let _ = writeln!(
                    out,
                    "- {}: ordinals {}..={} slope={:.6} intercept={:.6} r2={:.4}",
                    outcome.range, s.start_ordinal, s.end_ordinal, s.slope, s.intercept, s.r_squared
                );
            }
            Err(e) => {
                let _ = writeln!(out, "- {}: {e}", outcome.range);
            }
        }
    }

    out
}
