//! Embedding generation for semantic survey search
//!
//! ```text
//! EmbeddingProvider (trait)
//!     ├── LocalProvider     - Candle + sentence-transformers model
//!     ├── DisabledProvider  - semantic search switched off
//!     └── CachedProvider    - optional LRU decorator over another provider
//! ```
//!
//! Providers never return errors to the search path: `ensure_initialized()`
//! answers with a `bool` and `embed()` with an `Option`, and the searcher
//! falls back to keyword matching on `false`/`None`.

mod cache;
mod local;
mod provider;

pub use cache::CachedProvider;
pub use local::{
    LocalProvider, LocalProviderConfig, DEFAULT_MODEL_ID, DEFAULT_REVISION, EMBEDDING_DIM,
};
pub use provider::{DisabledProvider, Embedding, EmbeddingProvider, ModelStatus, ProviderStatus};
