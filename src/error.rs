//! Error types for schema interpretation and data validation.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: the schema cannot be interpreted at all.
#[derive(Debug, Error)]
pub enum InterpretError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("schema has no extractable attributes: root needs properties or a composition keyword")]
    NoExtractableAttributes,
}

impl InterpretError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            InterpretError::FileNotFound { .. } | InterpretError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Single data error found by the validator, keyed to a form field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// Dotted field key; array elements are indexed (`materials[0].name`).
    pub field: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors from the full JSON Schema conformance check.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Interpret(#[from] InterpretError),

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<FieldError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Interpret(e) => e.exit_code(),
            ValidateError::Invalid { .. } => 1,
        }
    }
}
