//! Extremum annotation around a breakpoint period.

use crate::domain::{Extrema, ExtremumPoint, MonthlyBucket, MonthlySeries, Period};
use crate::error::PipelineError;

const VIEW: &str = "extremum search";

/// Find the largest bucket before `breakpoint` and the largest on or after it.
///
/// Ties go to the earliest ordinal. Both sides must be non-empty.
pub fn find_extrema(series: &MonthlySeries, breakpoint: Period) -> Result<Extrema, PipelineError> {
    let buckets = series.buckets();
    let split = buckets.partition_point(|b| b.period < breakpoint);

    let before = first_max(&buckets[..split], 0)
        .ok_or_else(|| PipelineError::insufficient(VIEW, format!("before {breakpoint}"), 1, 0))?;
    let after = first_max(&buckets[split..], split)
        .ok_or_else(|| PipelineError::insufficient(VIEW, format!("{breakpoint} onwards"), 1, 0))?;

    Ok(Extrema {
        breakpoint,
        before,
        after,
    })
}

/// Stable argmax; `offset` is the global ordinal of `buckets[0]`.
fn first_max(buckets: &[MonthlyBucket], offset: usize) -> Option<ExtremumPoint> {
    let mut best: Option<ExtremumPoint> = None;
    for (i, bucket) in buckets.iter().enumerate() {
        if best.is_none_or(|b| bucket.total_unit > b.value) {
            best = Some(ExtremumPoint {
                ordinal: offset + i,
                period: bucket.period,
                value: bucket.total_unit,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn maxima_on_both_sides() {
        let series = MonthlySeries::from_units(&[("2016-01", 10), ("2016-02", 50), ("2017-01", 30), ("2017-02", 80)]);
        let extrema = find_extrema(&series, p("2017-01")).unwrap();

        assert_eq!(extrema.before.ordinal, 1);
        assert_eq!(extrema.before.value, 50);
        assert_eq!(extrema.before.period, p("2016-02"));
        assert_eq!(extrema.after.ordinal, 3);
        assert_eq!(extrema.after.value, 80);
    }

    #[test]
    fn ties_resolve_to_the_earliest_ordinal() {
        let series = MonthlySeries::from_units(&[
            ("2016-01", 7),
            ("2016-02", 9),
            ("2016-03", 9),
            ("2016-04", 4),
            ("2016-05", 4),
        ]);
        let extrema = find_extrema(&series, p("2016-04")).unwrap();
        assert_eq!(extrema.before.ordinal, 1);
        assert_eq!(extrema.after.ordinal, 3);
    }

    #[test]
    fn breakpoint_between_months_splits_correctly() {
        let series = MonthlySeries::from_units(&[("2016-01", 1), ("2016-03", 2), ("2016-05", 3)]);
        let extrema = find_extrema(&series, p("2016-04")).unwrap();
        assert_eq!(extrema.before.ordinal, 1);
        assert_eq!(extrema.after.ordinal, 2);
    }

    #[test]
    fn empty_side_is_insufficient() {
        let series = MonthlySeries::from_units(&[("2016-01", 1), ("2016-02", 2)]);

        let err = find_extrema(&series, p("2016-01")).unwrap_err();
        assert!(err.to_string().contains("before 2016-01"), "{err}");

        let err = find_extrema(&series, p("2016-03")).unwrap_err();
        assert!(err.to_string().contains("2016-03 onwards"), "{err}");
    }
}
