//! Chaining segments with a continuity offset.
//!
//! A later segment can be translated vertically so that it starts `gap` units
//! below where the earlier one ends. Only the intercept moves: the slope and the
//! underlying regression are left as fitted.

use tracing::warn;

use crate::domain::{MonthlySeries, SegmentRange, TrendSegment};
use crate::error::PipelineError;
use crate::fit::fit_segment;

/// Result of fitting one configured range.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOutcome {
    pub range: SegmentRange,
    pub result: Result<TrendSegment, PipelineError>,
}

/// Shift `next` so its first fitted value is `previous.last_value() - gap`.
pub fn apply_continuity(previous: &TrendSegment, next: &TrendSegment, gap: f64) -> TrendSegment {
    let shift = previous.last_value() - next.first_value() - gap;
    let intercept = next.intercept + shift;
    let fitted_values = (0..next.len()).map(|i| next.slope * i as f64 + intercept).collect();

    TrendSegment {
        intercept,
        fitted_values,
        ..next.clone()
    }
}

/// Fit every range in order.
///
/// With `continuity_gap` set, each segment after the first is adjusted against
/// its already-adjusted predecessor. A segment whose predecessor failed keeps
/// its raw fit.
pub fn fit_segments(
    series: &MonthlySeries,
    ranges: &[SegmentRange],
    continuity_gap: Option<f64>,
) -> Vec<SegmentOutcome> {
    let mut outcomes: Vec<SegmentOutcome> = Vec::with_capacity(ranges.len());

    for (idx, range) in ranges.iter().enumerate() {
        let previous = idx.checked_sub(1).map(|i| &outcomes[i].result);

        let result = match (continuity_gap, previous, fit_segment(series, range)) {
            (Some(gap), Some(Ok(previous)), Ok(segment)) => Ok(apply_continuity(previous, &segment, gap)),
            (Some(_), Some(Err(_)), Ok(segment)) => {
                warn!(range = %range, "previous segment failed; leaving segment unadjusted");
                Ok(segment)
            }
            (_, _, result) => result,
        };

        if let Err(err) = &result {
            warn!(range = %range, error = %err, "trend segment unavailable");
        }
        outcomes.push(SegmentOutcome { range: *range, result });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn segment(slope: f64, intercept: f64, len: usize, start_ordinal: usize) -> TrendSegment {
        TrendSegment {
            start_period: p("2010-01"),
            end_period: p("2010-12"),
            start_ordinal,
            end_ordinal: start_ordinal + len - 1,
            slope,
            intercept,
            r_squared: 1.0,
            fitted_values: (0..len).map(|i| slope * i as f64 + intercept).collect(),
        }
    }

    #[test]
    fn later_segment_starts_gap_below_the_earlier_end() {
        // A ends at 100 + 9 * 100 = 1000.
        let a = segment(100.0, 100.0, 10, 0);
        // B's raw start is 300.
        let b = segment(20.0, 300.0, 5, 12);

        let adjusted = apply_continuity(&a, &b, 50.0);
        assert!((adjusted.fitted_values[0] - 950.0).abs() < 1e-9);
        assert!((adjusted.first_value() - 950.0).abs() < 1e-9);
        assert_eq!(adjusted.slope, b.slope);
        assert!((adjusted.intercept - 950.0).abs() < 1e-9);
        assert!((adjusted.fitted_values[4] - (950.0 + 4.0 * 20.0)).abs() < 1e-9);
        assert_eq!(adjusted.start_ordinal, 12);
    }

    #[test]
    fn chaining_uses_the_adjusted_predecessor() {
        let series = MonthlySeries::from_units(&[
            ("2010-01", 10),
            ("2010-02", 20),
            ("2010-03", 30),
            ("2010-04", 500),
            ("2010-05", 510),
            ("2010-06", 0),
            ("2010-07", 0),
        ]);
        let ranges = [
            SegmentRange::new(p("2010-01"), Some(p("2010-03"))),
            SegmentRange::new(p("2010-04"), Some(p("2010-05"))),
            SegmentRange::new(p("2010-06"), None),
        ];

        let outcomes = fit_segments(&series, &ranges, Some(5.0));
        let second = outcomes[1].result.as_ref().unwrap();
        let third = outcomes[2].result.as_ref().unwrap();

        assert!((second.first_value() - 25.0).abs() < 1e-9);
        assert!((second.last_value() - 35.0).abs() < 1e-9);
        assert!((third.first_value() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn no_gap_means_raw_fits() {
        let series = MonthlySeries::from_units(&[("2010-01", 10), ("2010-02", 20), ("2010-03", 500), ("2010-04", 510)]);
        let ranges = [
            SegmentRange::new(p("2010-01"), Some(p("2010-02"))),
            SegmentRange::new(p("2010-03"), None),
        ];
        let outcomes = fit_segments(&series, &ranges, None);
        let second = outcomes[1].result.as_ref().unwrap();
        assert!((second.first_value() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn failed_predecessor_leaves_next_unadjusted() {
        let series = MonthlySeries::from_units(&[("2010-01", 10), ("2010-02", 500), ("2010-03", 510)]);
        let ranges = [
            SegmentRange::new(p("2010-01"), Some(p("2010-01"))),
            SegmentRange::new(p("2010-02"), None),
        ];
        let outcomes = fit_segments(&series, &ranges, Some(0.0));
        assert!(outcomes[0].result.is_err());
        let second = outcomes[1].result.as_ref().unwrap();
        assert!((second.first_value() - 500.0).abs() < 1e-9);
    }
}
