//! Opt-in embedding cache
//!
//! Wraps a provider with an LRU keyed by the exact input text. Without it,
//! every search re-embeds the whole corpus. Only successful embeddings are
//! stored, so a transient per-item failure is retried on the next search.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;

use super::provider::{Embedding, EmbeddingProvider, ProviderStatus};

/// Provider decorator that memoizes `embed()` results
pub struct CachedProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Embedding>>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Wrap `inner` only when `capacity` is non-zero
    pub fn wrap(inner: Arc<dyn EmbeddingProvider>, capacity: usize) -> Arc<dyn EmbeddingProvider> {
        match NonZeroUsize::new(capacity) {
            Some(capacity) => Arc::new(Self::new(inner, capacity)),
            None => inner,
        }
    }

    /// Number of cached embeddings
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl EmbeddingProvider for CachedProvider {
    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn ensure_initialized(&self) -> bool {
        self.inner.ensure_initialized()
    }

    fn embed(&self, text: &str) -> Option<Embedding> {
        if let Some(hit) = self.cache.lock().get(text) {
            trace!("Embedding cache hit");
            return Some(hit.clone());
        }

        let embedding = self.inner.embed(text)?;
        self.cache.lock().put(text.to_string(), embedding.clone());
        Some(embedding)
    }

    fn status(&self) -> ProviderStatus {
        self.inner.status()
    }
}
