//! Export the monthly series to CSV.
//!
//! One row per ordinal, with one extra column per fitted segment holding the
//! segment's value at that ordinal (blank outside the segment). This is the
//! shape a spreadsheet chart wants.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{MonthlySeries, TrendSegment};
use crate::error::AppError;
use crate::fit::SegmentOutcome;

/// Write the series and segment overlays to a CSV file.
pub fn write_series_csv(path: &Path, series: &MonthlySeries, segments: &[SegmentOutcome]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(file, series, segments)
}

pub fn write_series<W: Write>(writer: W, series: &MonthlySeries, segments: &[SegmentOutcome]) -> Result<(), AppError> {
    let fitted: Vec<(usize, &TrendSegment)> = segments
        .iter()
        .enumerate()
        .filter_map(|(idx, outcome)| outcome.result.as_ref().ok().map(|s| (idx + 1, s)))
        .collect();

    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec![
        "ordinal".to_string(),
        "period".to_string(),
        "total_bytes".to_string(),
        "total_unit".to_string(),
    ];
    header.extend(fitted.iter().map(|(n, _)| format!("segment_{n}")));
    out.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (ordinal, bucket) in series.buckets().iter().enumerate() {
        let mut row = vec![
            ordinal.to_string(),
            bucket.period.to_string(),
            format!("{:.0}", bucket.total_bytes),
            bucket.total_unit.to_string(),
        ];
        row.extend(
            fitted
                .iter()
                .map(|(_, s)| s.value_at_ordinal(ordinal).map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        out.write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SegmentRange;
    use crate::fit::fit_segments;

    #[test]
    fn overlays_align_on_ordinals() {
        let series = MonthlySeries::from_units(&[("2020-01", 1), ("2020-02", 2), ("2020-03", 3), ("2020-04", 4)]);
        let ranges = [
            SegmentRange::new("2020-05".parse().unwrap(), None),
            SegmentRange::new("2020-02".parse().unwrap(), Some("2020-03".parse().unwrap())),
        ];
        let segments = fit_segments(&series, &ranges, None);

        let mut buf = Vec::new();
        write_series(&mut buf, &series, &segments).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // The failed first range gets no column; the second keeps its number.
        assert_eq!(lines[0], "ordinal,period,total_bytes,total_unit,segment_2");
        assert!(lines[1].ends_with(",1,"), "{}", lines[1]);
        assert!(lines[2].starts_with("1,2020-02,"));
        assert!(lines[2].ends_with(",2,2.0000"), "{}", lines[2]);
        assert!(lines[3].ends_with(",3,3.0000"), "{}", lines[3]);
        assert!(lines[4].ends_with(",4,"), "{}", lines[4]);
    }
}
