//! Error types for surveylens-search

use surveylens_store::StoreError;
use thiserror::Error;

/// Errors that can occur in surveylens-search operations
#[derive(Error, Debug)]
pub enum SearchError {
    /// The query was empty or whitespace only
    #[error("Search query is required")]
    EmptyQuery,

    /// Survey storage failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Embedding provider unavailable
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SearchError {
    /// Whether the error was caused by the request rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}

impl From<candle_core::Error> for SearchError {
    fn from(err: candle_core::Error) -> Self {
        SearchError::Embedding(err.to_string())
    }
}

/// Result type for surveylens-search operations
pub type Result<T> = std::result::Result<T, SearchError>;
