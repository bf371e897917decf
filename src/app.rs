//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - reads the CSV and runs the pipeline
//! - prints the summary
//! - writes optional exports

use std::fs::File;
use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::domain::{ColumnMapping, PipelineConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `archive-trend` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is not an error; the file is optional.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = pipeline_config_from_args(&cli)?;
    let raws = crate::io::load_raw_records(&cli.file_path, &config.columns)?;
    let run = pipeline::run_pipeline(raws, &config)?;

    if cli.series {
        println!("{}", crate::report::format_series_table(&run.series));
    }
    println!("{}", crate::report::format_run_summary(&cli.file_path, &run, &config));

    if let Some(path) = &cli.export_json {
        crate::io::write_results_json(path, &run, &config)?;
        info!(path = %path.display(), "wrote results JSON");
    }
    if let Some(path) = &cli.export_csv {
        crate::io::write_series_csv(path, &run.series, &run.segments)?;
        info!(path = %path.display(), "wrote series CSV");
    }
    if cli.debug_bundle {
        let path = crate::debug::write_debug_bundle(Path::new("debug"), &cli.file_path, &run)?;
        info!(path = %path.display(), "wrote debug bundle");
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--debug` selects the level.
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_level(debug)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_log_level(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Resolve the pipeline configuration from a JSON file or from flags.
pub fn pipeline_config_from_args(cli: &Cli) -> Result<PipelineConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => load_config_json(path)?,
        None => PipelineConfig {
            columns: ColumnMapping {
                date_column: cli.date_column.clone(),
                size_column: cli.size_column.clone(),
            },
            unit_divisor: cli.unit_divisor,
            rounding_mode: cli.rounding,
            segment_ranges: if cli.segments.is_empty() {
                PipelineConfig::default_segment_ranges()
            } else {
                cli.segments.clone()
            },
            continuity_gap: cli.continuity_gap,
            breakpoint_period: cli.breakpoint,
            smooth_points: cli.smooth.then_some(cli.smooth_points),
            parallel_views: cli.parallel,
            diagnostics: false,
        },
    };

    config.diagnostics |= cli.debug;
    Ok(config)
}

fn load_config_json(path: &Path) -> Result<PipelineConfig, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open config JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid config JSON: {e}")))
}
