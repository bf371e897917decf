//! Monthly aggregation.
//!
//! Clean records are grouped by calendar month, summed, and converted into whole
//! output units. The result is the `MonthlySeries` every derived view reads.
//!
//! The grouped sum must not depend on record order. Floating-point addition is
//! not associative, so each month's addends are sorted before summing; any
//! permutation of the input then produces bit-identical totals.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::{CleanRecord, MonthlyBucket, MonthlySeries, Period, RoundingMode};
use crate::error::PipelineError;

/// Group clean records into a sorted monthly series.
pub fn aggregate_monthly(
    records: &[CleanRecord],
    unit_divisor: f64,
    rounding_mode: RoundingMode,
) -> Result<MonthlySeries, PipelineError> {
    if !unit_divisor.is_finite() || unit_divisor <= 0.0 {
        return Err(PipelineError::InvalidConfig(format!(
            "unit divisor must be finite and > 0, got {unit_divisor}"
        )));
    }
    if records.is_empty() {
        return Err(PipelineError::insufficient("monthly series", "input rows", 1, 0));
    }

    let mut groups: BTreeMap<Period, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(Period::from_date(record.date))
            .or_default()
            .push(record.size_bytes);
    }

    // BTreeMap iteration is already in period order.
    let buckets: Vec<MonthlyBucket> = groups
        .into_iter()
        .map(|(period, mut sizes)| {
            sizes.sort_by(f64::total_cmp);
            let total_bytes: f64 = sizes.iter().sum();
            MonthlyBucket {
                period,
                total_bytes,
                total_unit: rounding_mode.round(total_bytes / unit_divisor),
            }
        })
        .collect();

    for bucket in &buckets {
        debug!(period = %bucket.period, total_bytes = bucket.total_bytes, total_unit = bucket.total_unit, "bucket");
    }

    let series = MonthlySeries::from_sorted(buckets, unit_divisor, rounding_mode);
    info!(
        months = series.len(),
        first = %series.first_period().map(|p| p.to_string()).unwrap_or_default(),
        last = %series.last_period().map(|p| p.to_string()).unwrap_or_default(),
        "aggregated monthly series"
    );
    Ok(series)
}
