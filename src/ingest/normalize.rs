//! Field normalization: canonical names and strict date parsing.

use chrono::NaiveDate;

use crate::domain::{ColumnMapping, NormalizedRecord, RawRecord};
use crate::error::PipelineError;

/// The only accepted timestamp layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalize one raw record.
///
/// A timestamp that does not parse means the file is the wrong shape, so the
/// error is structural rather than a per-row skip.
pub fn normalize_record(raw: RawRecord, columns: &ColumnMapping) -> Result<NormalizedRecord, PipelineError> {
    let text = raw.timestamp.trim();
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| PipelineError::InvalidTimestamp {
        line: raw.line,
        column: columns.date_column.clone(),
        value: text.to_string(),
    })?;

    Ok(NormalizedRecord {
        line: raw.line,
        date,
        raw_size: raw.raw_size,
    })
}

/// Normalize every record, stopping at the first bad timestamp.
pub fn normalize_records(
    raws: impl IntoIterator<Item = RawRecord>,
    columns: &ColumnMapping,
) -> Result<Vec<NormalizedRecord>, PipelineError> {
    raws.into_iter().map(|raw| normalize_record(raw, columns)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(line: usize, timestamp: &str) -> RawRecord {
        RawRecord {
            line,
            timestamp: timestamp.to_string(),
            raw_size: "1".to_string(),
        }
    }

    #[test]
    fn parses_iso_dates() {
        let rec = normalize_record(raw(2, " 2017-10-03 "), &ColumnMapping::default()).unwrap();
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2017, 10, 3).unwrap());
        assert_eq!(rec.raw_size, "1");
    }

    #[test]
    fn other_layouts_abort_with_location() {
        let columns = ColumnMapping::default();
        let err = normalize_records(vec![raw(2, "2017-10-03"), raw(3, "03/10/2017")], &columns).unwrap_err();
        match err {
            PipelineError::InvalidTimestamp { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, columns.date_column);
                assert_eq!(value, "03/10/2017");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn datetime_suffix_is_rejected() {
        assert!(normalize_record(raw(2, "2017-10-03T00:00:00"), &ColumnMapping::default()).is_err());
        assert!(normalize_record(raw(2, ""), &ColumnMapping::default()).is_err());
    }
}
