//! Ingest pass: raw rows -> normalized rows -> clean rows.
//!
//! - `normalize`: canonical field names + strict `YYYY-MM-DD` dates (fatal on mismatch)
//! - `cleanse`: size repair + dropping of invalid/zero rows (counted, never fatal)

pub mod cleanse;
pub mod normalize;

pub use cleanse::*;
pub use normalize::*;

use tracing::info;

use crate::domain::{CleanRecord, ColumnMapping, RawRecord};
use crate::error::PipelineError;

/// Output of the ingest pass.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<CleanRecord>,
    pub stats: CleanseStats,
}

/// Run the normalizer and the cleanser over raw rows.
pub fn ingest_records(raws: Vec<RawRecord>, columns: &ColumnMapping) -> Result<IngestedData, PipelineError> {
    let normalized = normalize_records(raws, columns)?;
    let (records, stats) = cleanse(normalized);

    info!(
        rows_read = stats.rows_read,
        rows_used = stats.rows_used(),
        dropped_invalid = stats.dropped_invalid,
        dropped_zero = stats.dropped_zero,
        "ingested archive rows"
    );

    Ok(IngestedData { records, stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(line: usize, timestamp: &str, raw_size: &str) -> RawRecord {
        RawRecord {
            line,
            timestamp: timestamp.to_string(),
            raw_size: raw_size.to_string(),
        }
    }

    #[test]
    fn bad_dates_abort_even_on_zero_rows() {
        let raws = vec![raw(2, "2020-01-01", "5"), raw(3, "garbage", "0.00")];
        let err = ingest_records(raws, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTimestamp { line: 3, .. }));
    }

    #[test]
    fn counts_flow_through() {
        let raws = vec![
            raw(2, "2020-01-01", "5"),
            raw(3, "2020-01-31", "0.00"),
            raw(4, "2020-03-01", "x"),
        ];
        let data = ingest_records(raws, &ColumnMapping::default()).unwrap();
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.stats.rows_dropped(), 2);
    }
}
