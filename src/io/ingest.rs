//! CSV reading.
//!
//! Turns the archive export into `RawRecord`s: one per data row, holding the
//! untouched text of the configured timestamp and size columns. Nothing is
//! interpreted here; the `ingest` module does that.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{ColumnMapping, RawRecord};
use crate::error::{AppError, PipelineError};

/// Open `path` and read its raw records.
pub fn load_raw_records(path: &Path, columns: &ColumnMapping) -> Result<Vec<RawRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(read_raw_records(file, columns)?)
}

/// Read raw records from any CSV source.
///
/// Fails if either configured column is absent from the header or a row
/// cannot be decoded as CSV.
pub fn read_raw_records<R: Read>(reader: R, columns: &ColumnMapping) -> Result<Vec<RawRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Csv(format!("failed to read headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = column_index(&header_map, &columns.date_column)?;
    let size_idx = column_index(&header_map, &columns.size_column)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::Csv(format!("line {line}: {e}")))?;

        records.push(RawRecord {
            line,
            timestamp: cell(&record, date_idx),
            raw_size: cell(&record, size_idx),
        });
    }

    Ok(records)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, column: &str) -> Result<usize, PipelineError> {
    header_map
        .get(&normalize_header_name(column))
        .copied()
        .ok_or_else(|| PipelineError::MissingColumn {
            column: column.to_string(),
        })
}

fn cell(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}@timestamp per 30 days,Archive Size\n\
                          2017-01-05,\"1,099,511,627,776.00\"\n\
                          2017-02-04,0.00\n";

    #[test]
    fn reads_configured_columns() {
        let records = read_raw_records(SAMPLE.as_bytes(), &ColumnMapping::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].timestamp, "2017-01-05");
        assert_eq!(records[0].raw_size, "1,099,511,627,776.00");
        assert_eq!(records[1].raw_size, "0.00");
    }

    #[test]
    fn header_match_ignores_case_and_padding() {
        let csv = " DAY , bytes ,extra\n2020-01-01,5,x\n";
        let columns = ColumnMapping {
            date_column: "day".to_string(),
            size_column: "Bytes".to_string(),
        };
        let records = read_raw_records(csv.as_bytes(), &columns).unwrap();
        assert_eq!(records[0].raw_size, "5");
    }

    #[test]
    fn missing_column_is_structural() {
        let csv = "date,size\n2020-01-01,5\n";
        let err = read_raw_records(csv.as_bytes(), &ColumnMapping::default()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingColumn {
                column: "@timestamp per 30 days".to_string()
            }
        );
    }

    #[test]
    fn short_rows_yield_empty_cells() {
        let csv = "date,size\n2020-01-01\n";
        let columns = ColumnMapping {
            date_column: "date".to_string(),
            size_column: "size".to_string(),
        };
        let records = read_raw_records(csv.as_bytes(), &columns).unwrap();
        assert_eq!(records[0].raw_size, "");
    }
}
