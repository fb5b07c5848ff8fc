//! Common test utilities for surveylens-search integration tests.
//!
//! The stub provider maps texts to fixed vectors so similarity scores are
//! known in advance; no model download is needed.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use surveylens_search::{Embedding, EmbeddingProvider, ModelStatus, ProviderStatus};
use surveylens_store::{
    NewSurvey, OptionRecord, QuestionRecord, SqliteStore, StoreError, SurveyDetail,
    SurveyRepository, SurveySummary,
};

/// Vector with cosine similarity `similarity` to [`query_vector`]
pub fn vector_with_similarity(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).max(0.0).sqrt()]
}

/// The vector every stub query embeds to
pub fn query_vector() -> Vec<f32> {
    vec![1.0, 0.0]
}

/// Deterministic embedding provider for tests
///
/// Texts registered with [`StubProvider::with_text`] embed to their vector,
/// texts in the failure set embed to `None`, and anything else embeds to a
/// vector orthogonal to the query.
pub struct StubProvider {
    available: bool,
    init_ok: bool,
    vectors: HashMap<String, Vec<f32>>,
    failing: HashSet<String>,
    pub init_calls: AtomicUsize,
    pub embed_calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            available: true,
            init_ok: true,
            vectors: HashMap::new(),
            failing: HashSet::new(),
            init_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn failing_init() -> Self {
        Self {
            init_ok: false,
            ..Self::new()
        }
    }

    /// Register a query text that embeds to [`query_vector`]
    pub fn with_query(self, text: &str) -> Self {
        self.with_vector(text, query_vector())
    }

    /// Register a corpus text with a known similarity to the query
    pub fn with_text(self, text: &str, similarity: f32) -> Self {
        self.with_vector(text, vector_with_similarity(similarity))
    }

    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Make `embed(text)` return `None`
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for StubProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn ensure_initialized(&self) -> bool {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.available && self.init_ok
    }

    fn embed(&self, text: &str) -> Option<Embedding> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if !self.available || !self.init_ok || self.failing.contains(text) {
            return None;
        }
        let vector = self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0, 1.0]);
        Some(Embedding::from(vector))
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus {
            available: self.available,
            model: if self.init_ok {
                ModelStatus::Ready
            } else {
                ModelStatus::Failed
            },
            model_id: "stub".into(),
            device: "CPU".into(),
            error: None,
        }
    }
}

/// Repository whose next corpus scan fails once, then recovers
pub struct FlakyRepository {
    inner: SqliteStore,
    fail_next: AtomicBool,
}

impl FlakyRepository {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_next: AtomicBool::new(false),
        }
    }

    /// Fail the next `list_all_options` call
    pub fn fail_next_scan(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl SurveyRepository for FlakyRepository {
    fn list_all_questions(&self) -> surveylens_store::Result<Vec<QuestionRecord>> {
        self.inner.list_all_questions()
    }

    fn list_all_options(&self) -> surveylens_store::Result<Vec<OptionRecord>> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("database is locked")));
        }
        self.inner.list_all_options()
    }

    fn list_surveys(&self) -> surveylens_store::Result<Vec<SurveySummary>> {
        self.inner.list_surveys()
    }

    fn get_survey(&self, id: i64) -> surveylens_store::Result<Option<SurveyDetail>> {
        self.inner.get_survey(id)
    }
}

/// Store holding the single "Colors" survey
pub fn colors_store() -> SqliteStore {
    let store = SqliteStore::in_memory().expect("Failed to open store");
    store
        .import(&NewSurvey::new("Colors").question(
            "Q1",
            "What is your favorite color?",
            ["Red", "Blue", "Green"],
        ))
        .expect("Failed to import survey");
    store
}

/// Store with one survey holding the given questions, each without options
pub fn questions_store(texts: &[&str]) -> SqliteStore {
    let store = SqliteStore::in_memory().expect("Failed to open store");
    let survey = texts
        .iter()
        .enumerate()
        .fold(NewSurvey::new("Fixture"), |survey, (i, text)| {
            survey.question(format!("Q{}", i + 1), *text, Vec::<String>::new())
        });
    store.import(&survey).expect("Failed to import survey");
    store
}

pub fn arc<T: SurveyRepository + 'static>(store: T) -> Arc<dyn SurveyRepository> {
    Arc::new(store)
}
