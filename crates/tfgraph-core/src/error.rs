//! Centralized error types for tfgraph.

use thiserror::Error;

/// Main error type for graph parsing and loading.
#[derive(Error, Debug)]
pub enum TfGraphError {
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tfgraph operations.
pub type TfGraphResult<T> = Result<T, TfGraphError>;

impl TfGraphError {
    /// Create a parse error for a 1-based line number.
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Create an integrity error.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}
