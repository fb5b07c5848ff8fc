//! Error types for surveylens-store

use thiserror::Error;

/// Errors that can occur while reading or seeding the survey database
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Database was written by an incompatible schema version
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: String, found: String },

    /// Fixture data could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for surveylens-store operations
pub type Result<T> = std::result::Result<T, StoreError>;
