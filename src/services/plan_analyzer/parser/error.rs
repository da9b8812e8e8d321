//! Parser error types for plan documents

use thiserror::Error;

/// Errors that can occur while parsing an `EXPLAIN (FORMAT JSON)` document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid plan JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read plan document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty plan payload")]
    EmptyPayload,

    #[error("Unexpected top-level JSON type: {0}")]
    UnexpectedTopLevel(String),

    #[error("Missing Plan root")]
    MissingPlan,

    #[error("Invalid plan node at {path}: {reason}")]
    InvalidNode { path: String, reason: String },
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;
