//! Semantic search with keyword fallback
//!
//! [`SurveySearcher`] ranks questions and options by cosine similarity to the
//! query embedding. Every way the semantic path can fail before producing a
//! complete answer ends in [`keyword_search`] instead:
//!
//! | Stage                          | Outcome                              |
//! |--------------------------------|--------------------------------------|
//! | provider unavailable           | keyword search, logged at `info`     |
//! | model initialization failed    | keyword search, logged at `error`    |
//! | query could not be embedded    | keyword search, logged at `warn`     |
//! | corpus scan or scoring failed  | keyword search, logged at `error`    |
//! | one corpus item not embeddable | item skipped, scan continues         |
//!
//! Embeddings are computed for the whole corpus on every call unless the
//! provider is wrapped in a [`CachedProvider`](crate::embeddings::CachedProvider).

use std::sync::Arc;

use surveylens_store::SurveyRepository;
use tracing::{debug, error, info, warn};

use crate::embeddings::{Embedding, EmbeddingProvider};
use crate::error::{Result, SearchError};
use crate::keyword::keyword_search;
use crate::result::{SearchHit, SearchResult};
use crate::similarity::cosine_similarity;

/// Minimum similarity for a semantic match
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Why a semantic search fell back to keyword matching
#[derive(Debug)]
pub enum FallbackReason {
    /// The embedding runtime is not usable on this deployment
    Unavailable,
    /// The model failed to load (cached for the process lifetime)
    InitializationFailed,
    /// The query itself could not be embedded
    QueryEmbeddingFailed,
    /// The corpus scan or scoring loop failed
    Systemic(SearchError),
}

impl FallbackReason {
    fn log(&self, query: &str) {
        match self {
            FallbackReason::Unavailable => {
                info!("Semantic search unavailable, using keyword search");
            }
            FallbackReason::InitializationFailed => {
                error!("Embedding model failed to initialize, using keyword search");
            }
            FallbackReason::QueryEmbeddingFailed => {
                warn!(
                    "Failed to embed query {:?}, falling back to keyword search",
                    query
                );
            }
            FallbackReason::Systemic(e) => {
                error!("Semantic search failed: {}, falling back to keyword search", e);
            }
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Unavailable => write!(f, "semantic search unavailable"),
            FallbackReason::InitializationFailed => write!(f, "model initialization failed"),
            FallbackReason::QueryEmbeddingFailed => write!(f, "query embedding failed"),
            FallbackReason::Systemic(e) => write!(f, "semantic search failed: {}", e),
        }
    }
}

/// Search entry point over a survey corpus
///
/// Holds no per-query state; the only shared state is inside the provider.
/// Safe to share between threads.
#[derive(Clone)]
pub struct SurveySearcher {
    store: Arc<dyn SurveyRepository>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl SurveySearcher {
    pub fn new(store: Arc<dyn SurveyRepository>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, provider }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn store(&self) -> &Arc<dyn SurveyRepository> {
        &self.store
    }

    /// Case-insensitive substring search in scan order
    pub fn keyword_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        keyword_search(self.store.as_ref(), query)
    }

    /// Rank the corpus by similarity to `query`, keeping matches at or above
    /// `threshold`
    ///
    /// Falls back to [`keyword_search`](Self::keyword_search) when the
    /// semantic path cannot produce a complete answer. Only an error from
    /// that fallback is returned.
    pub fn semantic_search(&self, query: &str, threshold: f32) -> Result<Vec<SearchResult>> {
        match self.try_semantic(query, threshold) {
            Ok(results) => Ok(results),
            Err(reason) => {
                reason.log(query);
                self.keyword_search(query)
            }
        }
    }

    /// Run only the semantic path, reporting why it could not complete
    pub fn try_semantic(
        &self,
        query: &str,
        threshold: f32,
    ) -> std::result::Result<Vec<SearchResult>, FallbackReason> {
        if !self.provider.is_available() {
            return Err(FallbackReason::Unavailable);
        }

        if !self.provider.ensure_initialized() {
            return Err(FallbackReason::InitializationFailed);
        }

        let query_embedding = self
            .provider
            .embed(query)
            .ok_or(FallbackReason::QueryEmbeddingFailed)?;

        self.rank_corpus(&query_embedding, threshold)
            .map_err(FallbackReason::Systemic)
    }

    /// Dispatch a request-layer search
    ///
    /// Rejects empty queries, then runs semantic or keyword search and tags
    /// each result with `nlp_used`.
    pub fn search(&self, query: &str, use_semantic: bool, threshold: f32) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let results = if use_semantic {
            self.semantic_search(query, threshold)?
        } else {
            self.keyword_search(query)?
        };

        Ok(results.into_iter().map(SearchHit::from).collect())
    }

    fn rank_corpus(&self, query: &Embedding, threshold: f32) -> Result<Vec<SearchResult>> {
        info!("Performing semantic search with threshold {}", threshold);

        let questions = self.store.list_all_questions()?;
        let options = self.store.list_all_options()?;

        let mut results = Vec::new();
        let mut skipped = 0usize;

        for question in questions {
            match self.score(query, &question.text) {
                Some(similarity) if similarity >= threshold => {
                    results.push(SearchResult::question(question, Some(similarity)));
                }
                Some(_) => {}
                None => {
                    debug!("Skipping question {}: embedding failed", question.id);
                    skipped += 1;
                }
            }
        }

        for option in options {
            match self.score(query, &option.text) {
                Some(similarity) if similarity >= threshold => {
                    results.push(SearchResult::option(option, Some(similarity)));
                }
                Some(_) => {}
                None => {
                    debug!("Skipping option {}: embedding failed", option.id);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} corpus items that could not be embedded", skipped);
        }

        // Stable: ties keep questions ahead of options
        results.sort_by(|a, b| {
            let a = a.similarity().unwrap_or(f32::NEG_INFINITY);
            let b = b.similarity().unwrap_or(f32::NEG_INFINITY);
            b.total_cmp(&a)
        });

        info!("Semantic search found {} results", results.len());
        Ok(results)
    }

    fn score(&self, query: &Embedding, text: &str) -> Option<f32> {
        let embedding = self.provider.embed(text)?;
        Some(cosine_similarity(query.as_slice(), embedding.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{DisabledProvider, ProviderStatus};
    use surveylens_store::{NewSurvey, SqliteStore};

    /// Embeds every text as the same unit vector
    struct ConstantProvider;

    impl EmbeddingProvider for ConstantProvider {
        fn is_available(&self) -> bool {
            true
        }

        fn ensure_initialized(&self) -> bool {
            true
        }

        fn embed(&self, _text: &str) -> Option<Embedding> {
            Some(Embedding::from(vec![1.0, 0.0]))
        }

        fn status(&self) -> ProviderStatus {
            ProviderStatus::unavailable("constant", "test")
        }
    }

    fn store() -> Arc<SqliteStore> {
        let store = SqliteStore::in_memory().unwrap();
        store
            .import(&NewSurvey::new("Colors").question(
                "Q1",
                "What is your favorite color?",
                ["Red", "Blue", "Green"],
            ))
            .unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_empty_query_rejected() {
        let searcher = SurveySearcher::new(store(), Arc::new(ConstantProvider));

        let err = searcher.search("   ", true, DEFAULT_THRESHOLD).unwrap_err();
        assert!(err.is_client_error());
        assert!(searcher.search("", false, DEFAULT_THRESHOLD).is_err());
    }

    #[test]
    fn test_keyword_mode_has_no_nlp() {
        let searcher = SurveySearcher::new(store(), Arc::new(ConstantProvider));

        let hits = searcher.search("blue", false, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].nlp_used);
    }

    #[test]
    fn test_semantic_mode_scores_everything() {
        let searcher = SurveySearcher::new(store(), Arc::new(ConstantProvider));

        let hits = searcher.search("anything", true, DEFAULT_THRESHOLD).unwrap();
        // 1 question + 3 options, all with similarity 1.0
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|h| h.nlp_used));
        assert_eq!(hits[0].result.matched_option(), None);
    }

    #[test]
    fn test_disabled_provider_falls_back() {
        let searcher = SurveySearcher::new(store(), Arc::new(DisabledProvider::new("off")));

        let reason = searcher.try_semantic("blue", DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(reason, FallbackReason::Unavailable));

        let hits = searcher.search("blue", true, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(!hits[0].nlp_used);
    }

    #[test]
    fn test_fallback_reason_display() {
        assert_eq!(
            FallbackReason::InitializationFailed.to_string(),
            "model initialization failed"
        );
        assert_eq!(
            FallbackReason::Systemic(SearchError::EmptyQuery).to_string(),
            "semantic search failed: Search query is required"
        );
    }
}
