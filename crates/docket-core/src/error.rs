//! Error types for docket-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::normalization::NormalizeError;

/// Result type alias for docket operations
pub type Result<T> = std::result::Result<T, DocketError>;

/// Main error type for docket operations
#[derive(Error, Debug)]
pub enum DocketError {
    /// A cleaning rule received a value that is neither text nor missing
    #[error("row {row}, column '{column}': expected text, got {kind} value '{raw}'")]
    InvalidInputKind {
        row: usize,
        column: String,
        kind: &'static str,
        raw: String,
    },

    /// Plaintiff cleaning collapsed a name to nothing
    #[error("row {row}, column '{column}': '{raw}' cleans to an empty name")]
    EmptyResult {
        row: usize,
        column: String,
        raw: String,
    },

    /// Clustering was requested without a built or loaded similarity matrix
    #[error("no similarity matrix: build one or load a saved matrix before clustering")]
    MissingClusterInput,

    /// A persisted matrix is unreadable or does not match the current names
    #[error("malformed similarity matrix: {0}")]
    MalformedPersistedMatrix(String),

    /// The input table lacks a configured column
    #[error("column not found: {0}")]
    MissingColumn(String),

    /// A scorer returned a value outside [0, 1]
    #[error("similarity score {score} for ('{a}', '{b}') is outside [0, 1]")]
    ScoreOutOfRange { a: String, b: String, score: f64 },

    /// Bad clustering or sweep parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration errors
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl DocketError {
    /// Attach row and column context to a normalization failure.
    pub fn from_normalize(err: NormalizeError, row: usize, column: &str) -> Self {
        match err {
            NormalizeError::InvalidInputKind { kind, raw } => DocketError::InvalidInputKind {
                row,
                column: column.to_string(),
                kind,
                raw,
            },
            NormalizeError::EmptyResult { raw } => DocketError::EmptyResult {
                row,
                column: column.to_string(),
                raw,
            },
        }
    }
}

impl From<std::io::Error> for DocketError {
    fn from(err: std::io::Error) -> Self {
        DocketError::Io(err.to_string())
    }
}
