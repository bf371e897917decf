//! Read/write results JSON files.
//!
//! The results file is what a chart renderer consumes:
//! - the configuration the run used
//! - the monthly series with ordinals
//! - every configured segment (parameters + fitted values, or the error)
//! - the smooth curve and extrema when those stages ran
//! - diagnostics when enabled

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::{RunOutput, ViewResult};
use crate::debug::Diagnostics;
use crate::domain::{Extrema, Period, PipelineConfig, SmoothCurve, TrendSegment};
use crate::error::{AppError, PipelineError};

pub const TOOL_NAME: &str = "archive-trend";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub config: PipelineConfig,
    pub series: Vec<SeriesPoint>,
    pub segments: Vec<SegmentEntry>,
    pub curve: Option<ViewEntry<SmoothCurve>>,
    pub extrema: Option<ViewEntry<Extrema>>,
    pub diagnostics: Option<Diagnostics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub ordinal: usize,
    pub period: Period,
    pub total_bytes: f64,
    pub total_unit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentEntry {
    pub range: String,
    pub segment: Option<TrendSegment>,
    pub error: Option<String>,
}

/// A view that either produced a value or failed with a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewEntry<T> {
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T: Clone> ViewEntry<T> {
    fn from_result(result: &Result<T, PipelineError>) -> Self {
        match result {
            Ok(value) => Self {
                value: Some(value.clone()),
                error: None,
            },
            Err(e) => Self {
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

fn view_entry<T: Clone>(view: &ViewResult<T>) -> Option<ViewEntry<T>> {
    view.as_ref().map(ViewEntry::from_result)
}

impl ResultsFile {
    pub fn from_run(run: &RunOutput, config: &PipelineConfig) -> Self {
        let series = run
            .series
            .buckets()
            .iter()
            .enumerate()
            .map(|(ordinal, b)| SeriesPoint {
                ordinal,
                period: b.period,
                total_bytes: b.total_bytes,
                total_unit: b.total_unit,
            })
            .collect();

        let segments = run
            .segments
            .iter()
            .map(|outcome| SegmentEntry {
                range: outcome.range.to_string(),
                segment: outcome.result.as_ref().ok().cloned(),
                error: outcome.result.as_ref().err().map(ToString::to_string),
            })
            .collect();

        Self {
            tool: TOOL_NAME.to_string(),
            config: config.clone(),
            series,
            segments,
            curve: view_entry(&run.curve),
            extrema: view_entry(&run.extrema),
            diagnostics: run.diagnostics,
        }
    }
}

/// Write a results JSON file.
pub fn write_results_json(path: &Path, run: &RunOutput, config: &PipelineConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ResultsFile::from_run(run, config))
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    let results: ResultsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))?;
    Ok(results)
}
