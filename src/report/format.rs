//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numeric stages stay free of presentation concerns
//! - output changes are localized

use std::path::Path;

use crate::app::pipeline::RunOutput;
use crate::domain::{MonthlySeries, PipelineConfig, TrendSegment};

/// Labels for the output unit and the next larger one when the divisor is the default.
const UNIT_LABEL: &str = "TB";
const LARGER_UNIT_LABEL: &str = "PB";

/// Format the full run summary.
pub fn format_run_summary(input: &Path, run: &RunOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();
    let stats = &run.ingest_stats;

    out.push_str("=== archive-trend - Monthly Archived Data with Trend Lines ===\n");
    out.push_str(&format!("Input: {}\n", input.display()));
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped invalid={} zero={}\n",
        stats.rows_read,
        stats.rows_used(),
        stats.dropped_invalid,
        stats.dropped_zero,
    ));
    out.push_str(&format!(
        "Series: {} month(s) | {} | unit={} | rounding={:?}\n",
        run.series.len(),
        period_span(&run.series),
        unit_label(config.unit_divisor),
        config.rounding_mode,
    ));

    out.push_str("\nTrend segments:\n");
    if run.segments.is_empty() {
        out.push_str("  (none configured)\n");
    }
    for (idx, outcome) in run.segments.iter().enumerate() {
        match &outcome.result {
            Ok(segment) => out.push_str(&format_segment(idx + 1, segment)),
            Err(err) => out.push_str(&format!("  #{} {:<18} unavailable: {err}\n", idx + 1, outcome.range.to_string())),
        }
    }
    if let Some(gap) = config.continuity_gap {
        out.push_str(&format!("  (segments chained with continuity gap {gap})\n"));
    }

    if let Some(extrema) = &run.extrema {
        out.push_str("\nExtrema:\n");
        match extrema {
            Ok(e) => {
                out.push_str(&format!(
                    "  before {}: {} at {} (ordinal {})\n",
                    e.breakpoint, e.before.value, e.before.period, e.before.ordinal
                ));
                out.push_str(&format!(
                    "  from {}:   {} at {} (ordinal {})\n",
                    e.breakpoint, e.after.value, e.after.period, e.after.ordinal
                ));
            }
            Err(err) => out.push_str(&format!("  unavailable: {err}\n")),
        }
    }

    if let Some(curve) = &run.curve {
        out.push_str("\nSmoothing:\n");
        match curve {
            Ok(c) => out.push_str(&format!("  cubic spline, {} samples\n", c.xs.len())),
            Err(err) => out.push_str(&format!("  unavailable: {err}\n")),
        }
    }

    if let Some(d) = &run.diagnostics {
        out.push_str(&format!(
            "\nTotal Archived Data: {} {}\n",
            d.total_larger_units,
            larger_unit_label(config.unit_divisor)
        ));
    }

    out
}

/// Format the monthly series as a table.
pub fn format_series_table(series: &MonthlySeries) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>7} {:<8} {:>22} {:>10}", "ordinal", "period", "total_bytes", "total_unit").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<7} {:-<8} {:-<22} {:-<10}", "", "", "", "").trim_end());
    out.push('\n');

    for (ordinal, b) in series.buckets().iter().enumerate() {
        out.push_str(&format!(
            "{:>7} {:<8} {:>22.0} {:>10}\n",
            ordinal,
            b.period.to_string(),
            b.total_bytes,
            b.total_unit
        ));
    }

    out
}

fn format_segment(n: usize, s: &TrendSegment) -> String {
    format!(
        "  #{n} {:<18} n={:<4} slope={:>10.4}/month intercept={:>10.4} r2={:.4} [{:.2} -> {:.2}]\n",
        format!("{}..{}", s.start_period, s.end_period),
        s.len(),
        s.slope,
        s.intercept,
        s.r_squared,
        s.first_value(),
        s.last_value(),
    )
}

fn period_span(series: &MonthlySeries) -> String {
    match (series.first_period(), series.last_period()) {
        (Some(first), Some(last)) => format!("{first}..{last}"),
        _ => "empty".to_string(),
    }
}

fn unit_label(divisor: f64) -> String {
    if divisor == crate::domain::BYTES_PER_TB {
        UNIT_LABEL.to_string()
    } else {
        format!("{divisor} bytes")
    }
}

fn larger_unit_label(divisor: f64) -> String {
    if divisor == crate::domain::BYTES_PER_TB {
        LARGER_UNIT_LABEL.to_string()
    } else {
        format!("x {} bytes", divisor * crate::debug::LARGER_UNIT_FACTOR)
    }
}
