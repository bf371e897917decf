//! Presentation smoothing.
//!
//! Interpolates the monthly unit totals with a cubic spline over ordinal
//! positions and samples it densely. The curve is for drawing only; trends and
//! extrema are always computed on the integer series.

use tracing::debug;

use crate::domain::{MonthlySeries, SmoothCurve};
use crate::error::PipelineError;
use crate::math::{CubicSpline, MIN_SPLINE_KNOTS, linspace};

/// Sample count used when smoothing is enabled without an explicit count.
pub const DEFAULT_SMOOTH_POINTS: usize = 300;

const VIEW: &str = "smooth curve";

/// Sample a cubic spline through the series at `points` evenly spaced ordinals
/// spanning `[0, N-1]`.
pub fn smooth_series(series: &MonthlySeries, points: usize) -> Result<SmoothCurve, PipelineError> {
    if points < 2 {
        return Err(PipelineError::InvalidConfig(format!(
            "smoothing needs at least 2 sample points, got {points}"
        )));
    }

    let n = series.len();
    let range = match (series.first_period(), series.last_period()) {
        (Some(first), Some(last)) => format!("{first}..{last}"),
        _ => "empty series".to_string(),
    };
    if n < MIN_SPLINE_KNOTS {
        return Err(PipelineError::insufficient(VIEW, range, MIN_SPLINE_KNOTS, n));
    }

    let knots: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let values: Vec<f64> = series.buckets().iter().map(|b| b.total_unit as f64).collect();
    let spline = CubicSpline::not_a_knot(&knots, &values)
        .ok_or_else(|| PipelineError::insufficient(VIEW, range, MIN_SPLINE_KNOTS, n))?;

    let xs = linspace(0.0, (n - 1) as f64, points);
    let ys = xs.iter().map(|&x| spline.eval(x)).collect();

    debug!(knots = n, points, "smoothed series");
    Ok(SmoothCurve { xs, ys })
}
