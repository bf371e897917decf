//! Fitting a single trend segment.
//!
//! A segment is the run of buckets whose periods fall inside a `SegmentRange`.
//! Because the series is sorted, that run is contiguous and is found with two
//! binary searches. The line is fitted against the local ordinal (0 at the first
//! bucket of the run), not the global one.

use tracing::debug;

use crate::domain::{MonthlySeries, SegmentRange, TrendSegment};
use crate::error::PipelineError;
use crate::math::fit_line;

const VIEW: &str = "trend segment";

/// Fit an OLS line over the buckets inside `range`.
///
/// Fewer than two buckets in range is an error; a single point has no slope.
pub fn fit_segment(series: &MonthlySeries, range: &SegmentRange) -> Result<TrendSegment, PipelineError> {
    let buckets = series.buckets();
    let start = buckets.partition_point(|b| b.period < range.start);
    let end = match range.end {
        Some(end) => buckets.partition_point(|b| b.period <= end),
        None => buckets.len(),
    };
    let found = end.saturating_sub(start);
    if found < 2 {
        return Err(PipelineError::insufficient(VIEW, range.to_string(), 2, found));
    }

    let selected = &buckets[start..end];
    let xs: Vec<f64> = (0..found).map(|i| i as f64).collect();
    let ys: Vec<f64> = selected.iter().map(|b| b.total_unit as f64).collect();

    let fit = fit_line(&xs, &ys).ok_or_else(|| PipelineError::insufficient(VIEW, range.to_string(), 2, found))?;
    let fitted_values = xs.iter().map(|x| fit.slope * x + fit.intercept).collect();

    debug!(
        range = %range,
        points = found,
        slope = fit.slope,
        intercept = fit.intercept,
        r_squared = fit.r_squared,
        "fitted trend segment"
    );

    Ok(TrendSegment {
        start_period: selected[0].period,
        end_period: selected[found - 1].period,
        start_ordinal: start,
        end_ordinal: end - 1,
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        fitted_values,
    })
}
