//! Size repair and row filtering.
//!
//! The archive export formats sizes like `"1,234,567.00"` and writes zero-filled
//! placeholder rows for days where nothing was collected. Both are handled here:
//! the text is repaired into a number, and rows that end up unusable or zero are
//! dropped and counted.

use tracing::trace;

use crate::domain::{CleanRecord, NormalizedRecord};

/// Fixed fractional suffix emitted by the upstream size formatter.
const SIZE_SUFFIX: &str = ".00";

/// What the cleanser made of one size field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeValue {
    Bytes(f64),
    Zero,
    Invalid,
}

/// Row counts for one cleanse pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanseStats {
    pub rows_read: usize,
    pub dropped_invalid: usize,
    pub dropped_zero: usize,
}

impl CleanseStats {
    pub fn rows_used(&self) -> usize {
        self.rows_read - self.dropped_invalid - self.dropped_zero
    }

    pub fn rows_dropped(&self) -> usize {
        self.dropped_invalid + self.dropped_zero
    }
}

/// Repair and parse a raw size.
///
/// Negative and non-finite values are invalid: sizes are byte counts.
pub fn parse_size(raw: &str) -> SizeValue {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(SIZE_SUFFIX).unwrap_or(trimmed);
    let digits: String = trimmed.chars().filter(|&c| c != ',').collect();

    match digits.parse::<f64>() {
        Ok(v) if !v.is_finite() || v < 0.0 => SizeValue::Invalid,
        Ok(v) if v == 0.0 => SizeValue::Zero,
        Ok(v) => SizeValue::Bytes(v),
        Err(_) => SizeValue::Invalid,
    }
}

/// Keep only records with a usable, non-zero size.
pub fn cleanse(records: impl IntoIterator<Item = NormalizedRecord>) -> (Vec<CleanRecord>, CleanseStats) {
    let mut stats = CleanseStats::default();
    let mut clean = Vec::new();

    for record in records {
        stats.rows_read += 1;
        match parse_size(&record.raw_size) {
            SizeValue::Bytes(size_bytes) => clean.push(CleanRecord {
                date: record.date,
                size_bytes,
            }),
            SizeValue::Zero => {
                stats.dropped_zero += 1;
                trace!(line = record.line, "dropping zero-size row");
            }
            SizeValue::Invalid => {
                stats.dropped_invalid += 1;
                trace!(line = record.line, raw = %record.raw_size, "dropping row with unparsable size");
            }
        }
    }

    (clean, stats)
}
