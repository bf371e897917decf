//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the pipeline stages as plain values
//! - exported to JSON/CSV for the chart renderer
//! - loaded back from a config file

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Bytes per output unit used by default (binary terabytes).
pub const BYTES_PER_TB: f64 = 1_099_511_627_776.0;

/// Column names of the archive export the tool was written against.
pub const DEFAULT_DATE_COLUMN: &str = "@timestamp per 30 days";
pub const DEFAULT_SIZE_COLUMN: &str = "Archive Size";

/// A calendar month.
///
/// Ordering is chronological, so sorting by `Period` sorts the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Returns `None` unless `1 <= month <= 12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || PipelineError::InvalidConfig(format!("invalid period '{s}', expected YYYY-MM"));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for Period {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// How a monthly byte total is rounded into whole output units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Ties go to the even neighbour (2.5 -> 2, 3.5 -> 4).
    #[default]
    HalfEven,
    /// Ties go away from zero (2.5 -> 3). Totals are never negative, so this is half-up.
    HalfUp,
}

impl RoundingMode {
    pub fn round(self, value: f64) -> i64 {
        let rounded = match self {
            RoundingMode::HalfEven => value.round_ties_even(),
            RoundingMode::HalfUp => value.round(),
        };
        rounded as i64
    }
}

/// Maps the source's column names onto the canonical `date` / `raw_size` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date_column: String,
    pub size_column: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            size_column: DEFAULT_SIZE_COLUMN.to_string(),
        }
    }
}

/// Inclusive period range for one trend segment.
///
/// `end = None` means "up to the last period present in the data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SegmentRangeFields")]
pub struct SegmentRange {
    pub start: Period,
    pub end: Option<Period>,
}

/// Unchecked serde shape of a [`SegmentRange`].
#[derive(Deserialize)]
struct SegmentRangeFields {
    start: Period,
    end: Option<Period>,
}

impl TryFrom<SegmentRangeFields> for SegmentRange {
    type Error = PipelineError;

    fn try_from(fields: SegmentRangeFields) -> Result<Self, Self::Error> {
        SegmentRange::checked(fields.start, fields.end)
    }
}

impl SegmentRange {
    pub fn new(start: Period, end: Option<Period>) -> Self {
        Self { start, end }
    }

    /// Like [`SegmentRange::new`], but rejects an end before the start.
    pub fn checked(start: Period, end: Option<Period>) -> Result<Self, PipelineError> {
        match end {
            Some(end) if end < start => Err(PipelineError::InvalidConfig(format!(
                "segment {start}..{end} ends before it starts"
            ))),
            _ => Ok(Self { start, end }),
        }
    }

    pub fn contains(&self, period: Period) -> bool {
        period >= self.start && self.end.is_none_or(|end| period <= end)
    }
}

impl fmt::Display for SegmentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}..{}", self.start, end),
            None => write!(f, "{}..last", self.start),
        }
    }
}

impl FromStr for SegmentRange {
    type Err = PipelineError;

    /// Parses `START:END`, where `END` may be empty or `last`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s.split_once(':').ok_or_else(|| {
            PipelineError::InvalidConfig(format!("invalid segment '{s}', expected START:END (e.g. 2008-10:2017-10)"))
        })?;

        let start: Period = start.parse()?;
        let end = match end.trim() {
            "" | "last" => None,
            other => Some(other.parse::<Period>()?),
        };

        Self::checked(start, end)
    }
}

/// A row as read from the source, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file (header is line 1).
    pub line: usize,
    pub timestamp: String,
    pub raw_size: String,
}

/// A row with canonical field names and a parsed date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub line: usize,
    pub date: NaiveDate,
    pub raw_size: String,
}

/// A row whose size parsed to a finite, positive byte count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanRecord {
    pub date: NaiveDate,
    pub size_bytes: f64,
}

/// Total archived volume for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub period: Period,
    pub total_bytes: f64,
    pub total_unit: i64,
}

/// The aggregated series every derived view reads.
///
/// Buckets are sorted by period and the index into `buckets()` is the ordinal.
/// The series cannot be mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    buckets: Vec<MonthlyBucket>,
    unit_divisor: f64,
    rounding_mode: RoundingMode,
}

impl MonthlySeries {
    /// Callers must pass buckets sorted by period with no duplicates.
    pub(crate) fn from_sorted(buckets: Vec<MonthlyBucket>, unit_divisor: f64, rounding_mode: RoundingMode) -> Self {
        debug_assert!(buckets.windows(2).all(|w| w[0].period < w[1].period));
        Self {
            buckets,
            unit_divisor,
            rounding_mode,
        }
    }

    pub fn buckets(&self) -> &[MonthlyBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn unit_divisor(&self) -> f64 {
        self.unit_divisor
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        self.rounding_mode
    }

    pub fn first_period(&self) -> Option<Period> {
        self.buckets.first().map(|b| b.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.buckets.last().map(|b| b.period)
    }

    /// Ordinal of `period`, if that month is present.
    pub fn ordinal_of(&self, period: Period) -> Option<usize> {
        self.buckets.binary_search_by_key(&period, |b| b.period).ok()
    }

    /// Sum of `total_unit` over all buckets.
    pub fn total_units(&self) -> i64 {
        self.buckets.iter().map(|b| b.total_unit).sum()
    }

    /// Build a series directly from `(YYYY-MM, total_unit)` pairs.
    #[cfg(test)]
    pub(crate) fn from_units(units: &[(&str, i64)]) -> Self {
        let mut buckets: Vec<MonthlyBucket> = units
            .iter()
            .map(|(period, unit)| MonthlyBucket {
                period: period.parse().unwrap(),
                total_bytes: *unit as f64 * BYTES_PER_TB,
                total_unit: *unit,
            })
            .collect();
        buckets.sort_by_key(|b| b.period);
        Self::from_sorted(buckets, BYTES_PER_TB, RoundingMode::HalfEven)
    }
}

/// A straight line fitted over a contiguous run of buckets.
///
/// `fitted_values[i] = slope * i + intercept`, where `i` is the local ordinal
/// (0 at `start_ordinal`). The global ordinals only place the line on the
/// series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub start_period: Period,
    pub end_period: Period,
    pub start_ordinal: usize,
    pub end_ordinal: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub fitted_values: Vec<f64>,
}

impl TrendSegment {
    pub fn len(&self) -> usize {
        self.fitted_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitted_values.is_empty()
    }

    pub fn value_at(&self, local: usize) -> f64 {
        self.slope * local as f64 + self.intercept
    }

    pub fn first_value(&self) -> f64 {
        self.value_at(0)
    }

    pub fn last_value(&self) -> f64 {
        self.value_at(self.len().saturating_sub(1))
    }

    /// Global ordinals covered by this segment, in order.
    pub fn global_ordinals(&self) -> std::ops::RangeInclusive<usize> {
        self.start_ordinal..=self.end_ordinal
    }

    /// Fitted value at a global ordinal, if the segment covers it.
    pub fn value_at_ordinal(&self, ordinal: usize) -> Option<f64> {
        self.global_ordinals()
            .contains(&ordinal)
            .then(|| self.fitted_values[ordinal - self.start_ordinal])
    }
}

/// Densified spline samples over ordinal positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothCurve {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremumPoint {
    pub ordinal: usize,
    pub period: Period,
    pub value: i64,
}

/// Maxima on either side of a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extrema {
    pub breakpoint: Period,
    /// Largest bucket strictly before the breakpoint.
    pub before: ExtremumPoint,
    /// Largest bucket on or after the breakpoint.
    pub after: ExtremumPoint,
}

/// Everything that shapes a pipeline run.
///
/// Built from CLI flags (plus defaults), or loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: ColumnMapping,
    /// Bytes per output unit.
    pub unit_divisor: f64,
    pub rounding_mode: RoundingMode,
    pub segment_ranges: Vec<SegmentRange>,
    /// When set, each segment after the first is shifted to start this far
    /// below the end of the previous one.
    pub continuity_gap: Option<f64>,
    /// When set, the extremum stage runs around this period.
    pub breakpoint_period: Option<Period>,
    /// When set, the smoothing stage runs with this many samples.
    pub smooth_points: Option<usize>,
    /// Evaluate the derived views on the rayon pool.
    pub parallel_views: bool,
    /// Report the grand total in the next larger unit.
    pub diagnostics: bool,
}

impl PipelineConfig {
    /// Segment ranges used when none are configured.
    pub fn default_segment_ranges() -> Vec<SegmentRange> {
        let period = |y, m| Period { year: y, month: m };
        vec![
            SegmentRange::new(period(2008, 10), Some(period(2017, 10))),
            SegmentRange::new(period(2018, 6), None),
        ]
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            unit_divisor: BYTES_PER_TB,
            rounding_mode: RoundingMode::default(),
            segment_ranges: Self::default_segment_ranges(),
            continuity_gap: None,
            breakpoint_period: None,
            smooth_points: None,
            parallel_views: false,
            diagnostics: false,
        }
    }
}
