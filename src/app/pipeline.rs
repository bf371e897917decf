//! The archive trend pipeline.
//!
//! normalize -> cleanse -> aggregate -> {segments, smoothing, extrema}
//!
//! The first three stages are fatal on error. The derived views each report
//! their own failure and never stop the others. Smoothing and extremum search
//! only run when configured.

use rayon::join;
use tracing::warn;

use crate::annotate::find_extrema;
use crate::debug::{Diagnostics, compute_diagnostics};
use crate::domain::{Extrema, MonthlySeries, PipelineConfig, RawRecord, SmoothCurve};
use crate::error::PipelineError;
use crate::fit::{SegmentOutcome, fit_segments};
use crate::ingest::{CleanseStats, ingest_records};
use crate::series::aggregate_monthly;
use crate::smooth::smooth_series;

/// Outcome of an optional view: `None` when the stage is disabled.
pub type ViewResult<T> = Option<Result<T, PipelineError>>;

/// The three views derived from the monthly series.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedViews {
    pub segments: Vec<SegmentOutcome>,
    pub curve: ViewResult<SmoothCurve>,
    pub extrema: ViewResult<Extrema>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest_stats: CleanseStats,
    pub series: MonthlySeries,
    pub segments: Vec<SegmentOutcome>,
    pub curve: ViewResult<SmoothCurve>,
    pub extrema: ViewResult<Extrema>,
    pub diagnostics: Option<Diagnostics>,
}

impl RunOutput {
    /// Number of configured views that failed.
    pub fn failed_views(&self) -> usize {
        let segments = self.segments.iter().filter(|s| s.result.is_err()).count();
        let curve = usize::from(matches!(self.curve, Some(Err(_))));
        let extrema = usize::from(matches!(self.extrema, Some(Err(_))));
        segments + curve + extrema
    }
}

/// Run every stage over already-read raw records.
pub fn run_pipeline(raws: Vec<RawRecord>, config: &PipelineConfig) -> Result<RunOutput, PipelineError> {
    let ingest = ingest_records(raws, &config.columns)?;
    let series = aggregate_monthly(&ingest.records, config.unit_divisor, config.rounding_mode)?;

    let views = derive_views(&series, config);
    let failures = [
        views.curve.as_ref().and_then(|r| r.as_ref().err()),
        views.extrema.as_ref().and_then(|r| r.as_ref().err()),
    ];
    for failure in failures.into_iter().flatten() {
        warn!(error = %failure, "view unavailable");
    }

    let diagnostics = config
        .diagnostics
        .then(|| compute_diagnostics(&series, &ingest.stats));

    Ok(RunOutput {
        ingest_stats: ingest.stats,
        series,
        segments: views.segments,
        curve: views.curve,
        extrema: views.extrema,
        diagnostics,
    })
}

/// Compute the derived views, on the rayon pool when `parallel_views` is set.
pub fn derive_views(series: &MonthlySeries, config: &PipelineConfig) -> DerivedViews {
    let segments = || fit_segments(series, &config.segment_ranges, config.continuity_gap);
    let curve = || config.smooth_points.map(|points| smooth_series(series, points));
    let extrema = || config.breakpoint_period.map(|breakpoint| find_extrema(series, breakpoint));

    let (segments, (curve, extrema)) = if config.parallel_views {
        join(segments, || join(curve, extrema))
    } else {
        (segments(), (curve(), extrema()))
    };

    DerivedViews {
        segments,
        curve,
        extrema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BYTES_PER_TB, Period, SegmentRange};

    fn raw(line: usize, timestamp: &str, raw_size: &str) -> RawRecord {
        RawRecord {
            line,
            timestamp: timestamp.to_string(),
            raw_size: raw_size.to_string(),
        }
    }

    /// Two rows per month for 2016..=2017, growing linearly, plus noise rows.
    fn raws() -> Vec<RawRecord> {
        let mut out = Vec::new();
        let mut line = 2;
        for year in 2016..=2017 {
            for month in 1..=12u32 {
                let ordinal = (year - 2016) * 12 + month as i32 - 1;
                let half_tb = (5 * ordinal + 100) as f64 * BYTES_PER_TB / 2.0;
                for day in ["03", "17"] {
                    out.push(raw(line, &format!("{year}-{month:02}-{day}"), &format!("{half_tb:.0}.00")));
                    line += 1;
                }
                out.push(raw(line, &format!("{year}-{month:02}-28"), "0.00"));
                line += 1;
            }
        }
        out.push(raw(line, "2017-12-30", "not a number"));
        out
    }

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            segment_ranges: vec![
                SegmentRange::new(p("2016-01"), Some(p("2016-12"))),
                SegmentRange::new(p("2017-01"), None),
            ],
            continuity_gap: Some(50.0),
            breakpoint_period: Some(p("2017-01")),
            smooth_points: Some(100),
            diagnostics: true,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn full_run_produces_every_view() {
        let run = run_pipeline(raws(), &config()).unwrap();

        assert_eq!(run.ingest_stats.rows_read, 24 * 3 + 1);
        assert_eq!(run.ingest_stats.dropped_zero, 24);
        assert_eq!(run.ingest_stats.dropped_invalid, 1);
        assert_eq!(run.series.len(), 24);
        assert_eq!(run.series.buckets()[0].total_unit, 100);
        assert_eq!(run.series.buckets()[23].total_unit, 215);

        let first = run.segments[0].result.as_ref().unwrap();
        assert!((first.slope - 5.0).abs() < 1e-9);
        assert!((first.last_value() - 155.0).abs() < 1e-9);

        let second = run.segments[1].result.as_ref().unwrap();
        assert_eq!(second.start_ordinal, 12);
        assert!((second.first_value() - 105.0).abs() < 1e-9);

        let curve = run.curve.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(curve.xs.len(), 100);

        let extrema = run.extrema.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(extrema.before.ordinal, 11);
        assert_eq!(extrema.after.ordinal, 23);

        let diagnostics = run.diagnostics.unwrap();
        assert_eq!(diagnostics.total_units, run.series.total_units());
        assert_eq!(run.failed_views(), 0);
    }

    #[test]
    fn disabled_stages_produce_nothing() {
        let config = PipelineConfig {
            breakpoint_period: None,
            smooth_points: None,
            diagnostics: false,
            ..config()
        };
        let run = run_pipeline(raws(), &config).unwrap();
        assert!(run.curve.is_none());
        assert!(run.extrema.is_none());
        assert!(run.diagnostics.is_none());
    }

    #[test]
    fn one_failing_view_does_not_stop_the_others() {
        let config = PipelineConfig {
            segment_ranges: vec![SegmentRange::new(p("2017-12"), None)],
            breakpoint_period: Some(p("2016-01")),
            ..config()
        };
        let run = run_pipeline(raws(), &config).unwrap();

        assert!(matches!(run.segments[0].result, Err(PipelineError::InsufficientData { found: 1, .. })));
        assert!(matches!(run.extrema, Some(Err(PipelineError::InsufficientData { .. }))));
        assert!(matches!(run.curve, Some(Ok(_))));
        assert_eq!(run.failed_views(), 2);
    }

    #[test]
    fn parallel_views_match_sequential() {
        let sequential = run_pipeline(raws(), &config()).unwrap();
        let parallel_config = PipelineConfig {
            parallel_views: true,
            ..config()
        };
        let parallel = derive_views(&sequential.series, &parallel_config);

        assert_eq!(parallel.segments, sequential.segments);
        assert_eq!(parallel.curve, sequential.curve);
        assert_eq!(parallel.extrema, sequential.extrema);
    }

    #[test]
    fn csv_text_end_to_end() {
        let csv = "@timestamp per 30 days,Archive Size\n\
                   2008-10-01,\"1,099,511,627,776.00\"\n\
                   2008-10-31,\"1,099,511,627,776.00\"\n\
                   2008-11-30,0.00\n\
                   2008-12-30,\"3,298,534,883,328.00\"\n\
                   2009-01-29,\"4,398,046,511,104.00\"\n";
        let raws = crate::io::read_raw_records(csv.as_bytes(), &PipelineConfig::default().columns).unwrap();
        let config = PipelineConfig {
            segment_ranges: vec![SegmentRange::new(p("2008-10"), None)],
            ..PipelineConfig::default()
        };
        let run = run_pipeline(raws, &config).unwrap();

        let units: Vec<i64> = run.series.buckets().iter().map(|b| b.total_unit).collect();
        assert_eq!(units, vec![2, 3, 4]);
        assert_eq!(run.ingest_stats.dropped_zero, 1);
        let segment = run.segments[0].result.as_ref().unwrap();
        assert!((segment.slope - 1.0).abs() < 1e-9);
        assert!((segment.intercept - 2.0).abs() < 1e-9);
    }

    #[test]
    fn structural_errors_abort_the_run() {
        let mut rows = raws();
        rows.push(raw(999, "31-12-2017", "5"));
        let err = run_pipeline(rows, &config()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTimestamp { line: 999, .. }));
    }
}
