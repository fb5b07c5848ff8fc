//! Embedding provider trait and types

use serde::Serialize;

/// A sentence embedding
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of dimensions
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Lifecycle of a lazily loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelStatus {
    /// Not loaded yet
    Uninitialized,
    /// Loaded and serving embeddings
    Ready,
    /// Loading failed; not retried for the life of the process
    Failed,
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelStatus::Uninitialized => write!(f, "uninitialized"),
            ModelStatus::Ready => write!(f, "ready"),
            ModelStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Status of an embedding provider
///
/// Contains availability and model state for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    /// Whether semantic search can run on this deployment at all
    pub available: bool,
    /// Model lifecycle state
    pub model: ModelStatus,
    /// Model identifier
    pub model_id: String,
    /// Device being used ("CPU", "Metal", "CUDA", "N/A")
    pub device: String,
    /// Error message if unavailable or failed
    pub error: Option<String>,
}

impl ProviderStatus {
    /// Create a status for a provider that can never embed
    pub fn unavailable(model_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            available: false,
            model: ModelStatus::Uninitialized,
            model_id: model_id.into(),
            device: "N/A".into(),
            error: Some(error.into()),
        }
    }
}

/// Embedding provider trait
///
/// Core abstraction for turning text into vectors. None of the methods fail
/// loudly: callers branch on the returned `bool`/`Option` and fall back to
/// keyword search.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; model state is shared by every
/// search running in the process.
pub trait EmbeddingProvider: Send + Sync {
    /// Whether the embedding runtime is usable on this deployment
    ///
    /// Decided once when the provider is built and never re-probed.
    fn is_available(&self) -> bool;

    /// Load the model on first call
    ///
    /// Idempotent. Returns the cached outcome on later calls, including a
    /// cached failure.
    fn ensure_initialized(&self) -> bool;

    /// Embed one text
    ///
    /// Returns `None` if the model is not initialized or encoding fails.
    fn embed(&self, text: &str) -> Option<Embedding>;

    /// Availability and model state for diagnostics
    fn status(&self) -> ProviderStatus;
}

/// Provider used when semantic search is switched off
///
/// Always unavailable, so every semantic search falls straight through to
/// keyword search.
#[derive(Debug, Clone, Default)]
pub struct DisabledProvider {
    reason: String,
}

impl DisabledProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl EmbeddingProvider for DisabledProvider {
    fn is_available(&self) -> bool {
        false
    }

    fn ensure_initialized(&self) -> bool {
        false
    }

    fn embed(&self, _text: &str) -> Option<Embedding> {
        None
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus::unavailable("none", self.reason.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_accessors() {
        let embedding = Embedding::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(embedding.dim(), 3);
        assert_eq!(embedding.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(embedding.into_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_model_status_display() {
        assert_eq!(ModelStatus::Uninitialized.to_string(), "uninitialized");
        assert_eq!(ModelStatus::Ready.to_string(), "ready");
        assert_eq!(ModelStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_disabled_provider_never_embeds() {
        let provider = DisabledProvider::new("disabled in config");
        assert!(!provider.is_available());
        assert!(!provider.ensure_initialized());
        assert!(provider.embed("anything").is_none());

        let status = provider.status();
        assert!(!status.available);
        assert_eq!(status.error.as_deref(), Some("disabled in config"));
    }
}
