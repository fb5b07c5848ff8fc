//! SurveyLens Search - Semantic survey search with keyword fallback
//!
//! Ranks survey questions and options against a free-text query using
//! sentence embeddings when they are available, and falls back to
//! case-insensitive substring matching whenever they are not.
//!
//! # Features
//!
//! - **Local embeddings**: sentence-transformers model run with Candle,
//!   loaded lazily on first semantic search
//! - **Graceful degradation**: unavailable runtime, failed model load, failed
//!   query embedding and storage errors all end in keyword search
//! - **Tagged results**: question and option matches share one serialized shape
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use surveylens_search::{LocalProvider, SurveySearcher, DEFAULT_THRESHOLD};
//! use surveylens_store::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::open(".surveylens/surveys.db")?);
//! let provider = Arc::new(LocalProvider::new(Default::default()));
//! let searcher = SurveySearcher::new(store, provider);
//!
//! for hit in searcher.search("favourite colour", true, DEFAULT_THRESHOLD)? {
//!     println!("{:?} nlp_used={}", hit.result.similarity(), hit.nlp_used);
//! }
//! ```

pub mod embeddings;
mod error;
pub mod keyword;
mod result;
pub mod semantic;
mod similarity;

// Re-exports for convenience
pub use embeddings::{
    CachedProvider, DisabledProvider, Embedding, EmbeddingProvider, LocalProvider,
    LocalProviderConfig, ModelStatus, ProviderStatus, DEFAULT_MODEL_ID, DEFAULT_REVISION,
    EMBEDDING_DIM,
};
pub use error::{Result, SearchError};
pub use keyword::keyword_search;
pub use result::{MatchType, MatchedQuestion, SearchHit, SearchResult};
pub use semantic::{FallbackReason, SurveySearcher, DEFAULT_THRESHOLD};
pub use similarity::cosine_similarity;
