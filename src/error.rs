//! Error types for tinytable
//!
//! Provides a unified error type for all table operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for tinytable operations
#[derive(Debug, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    /// Duplicate column name, invalid size or unknown type kind
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // File Format Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported format version {found} in {file} file")]
    VersionMismatch { file: &'static str, found: i64 },

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    /// Value kind disagrees with the column kind, or the value does not fit
    #[error("Type mismatch for column '{column}': {detail}")]
    TypeMismatch { column: String, detail: String },

    #[error("Malformed value: {0}")]
    MalformedValue(String),

    // -------------------------------------------------------------------------
    // Row Errors
    // -------------------------------------------------------------------------
    #[error("Row {0} is deleted")]
    RowDeleted(i64),

    #[error("Row {row} out of range (row count {count})")]
    OutOfRange { row: i64, count: i64 },
}

impl TableError {
    pub(crate) fn type_mismatch(column: &str, detail: impl Into<String>) -> Self {
        TableError::TypeMismatch {
            column: column.to_string(),
            detail: detail.into(),
        }
    }
}
