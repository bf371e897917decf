//! Error types.
//!
//! - `PipelineError` is what the library components return. Each variant knows
//!   its `ErrorKind`, which decides whether it aborts the run or only the view
//!   that produced it.
//! - `AppError` is the binary-facing error: a message plus a process exit code.

use thiserror::Error;

/// Coarse classification of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file is structurally wrong. Fatal for the whole run.
    StructuralInput,
    /// Too few points for one derived view. Fatal only for that view.
    InsufficientData,
    /// A configuration value is malformed or out of range.
    InvalidConfig,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("line {line}: column `{column}` value '{value}' is not a YYYY-MM-DD date")]
    InvalidTimestamp {
        line: usize,
        column: String,
        value: String,
    },

    #[error("failed to read CSV input: {0}")]
    Csv(String),

    #[error("{view} over {range}: need at least {required} point(s), found {found}")]
    InsufficientData {
        view: &'static str,
        range: String,
        required: usize,
        found: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::MissingColumn { .. }
            | PipelineError::InvalidTimestamp { .. }
            | PipelineError::Csv(_) => ErrorKind::StructuralInput,
            PipelineError::InsufficientData { .. } => ErrorKind::InsufficientData,
            PipelineError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    pub(crate) fn insufficient(view: &'static str, range: impl Into<String>, required: usize, found: usize) -> Self {
        PipelineError::InsufficientData {
            view,
            range: range.into(),
            required,
            found,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match err.kind() {
            ErrorKind::StructuralInput | ErrorKind::InvalidConfig => 2,
            ErrorKind::InsufficientData => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_exit_with_two() {
        let err = PipelineError::MissingColumn {
            column: "Archive Size".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::StructuralInput);

        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
        assert!(app.to_string().contains("Archive Size"));
    }

    #[test]
    fn insufficient_data_names_the_range() {
        let err = PipelineError::insufficient("trend segment", "2017-01..2017-01", 2, 1);
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        let msg = err.to_string();
        assert!(msg.contains("2017-01..2017-01"), "{msg}");
        assert!(msg.contains("found 1"), "{msg}");
        assert_eq!(AppError::from(err).exit_code(), 3);
    }
}
