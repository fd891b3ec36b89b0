//! Error types for the Keyscope library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Keyscope operations.
#[derive(Debug, Error)]
pub enum KeyscopeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A referenced column is absent from the dataset. Always fatal to the
    /// operation that raised it.
    #[error("Invalid column: '{column}' is not present in the dataset")]
    InvalidColumn { column: String },

    /// A row does not match the declared column count.
    #[error("Row {row} has {actual} values, expected {expected}")]
    RowShape {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Duplicate column name in the header.
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Keyscope operations.
pub type Result<T> = std::result::Result<T, KeyscopeError>;
