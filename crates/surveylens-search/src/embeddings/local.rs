//! Local embedding provider using Candle and a sentence-transformers model
//!
//! Default model: `sentence-transformers/all-MiniLM-L6-v2` (BERT, 384 dimensions).
//! Sentence vectors are the attention-masked mean of the last hidden state.
//!
//! GPU acceleration via compile-time features:
//! - `--features metal` for macOS Metal/MPS
//! - `--features cuda` for NVIDIA CUDA

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, error, info, warn};

use super::provider::{Embedding, EmbeddingProvider, ModelStatus, ProviderStatus};
use crate::error::{Result, SearchError};

/// Default sentence embedding model on HuggingFace Hub
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Default model revision
pub const DEFAULT_REVISION: &str = "main";

/// Output dimension of the default model
pub const EMBEDDING_DIM: usize = 384;

/// Data type for model inference
const DTYPE: DType = DType::F32;

/// Lower bound for the real-token count in mean pooling
const MEAN_POOL_MIN_TOKENS: f64 = 1e-9;

/// Input length used when the model config does not state one
const DEFAULT_MAX_POSITIONS: usize = 512;

/// Process-wide device probe, run at most once
static DEVICE_PROBE: OnceCell<Option<Device>> = OnceCell::new();

/// Where to load the model from
#[derive(Debug, Clone)]
pub struct LocalProviderConfig {
    /// HuggingFace model ID
    pub model_id: String,
    /// Model revision (branch, tag or commit)
    pub revision: String,
    /// Load `config.json`, `tokenizer.json` and `model.safetensors` from this
    /// directory instead of the Hub
    pub model_dir: Option<PathBuf>,
    /// HuggingFace cache directory override
    pub cache_dir: Option<PathBuf>,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            model_dir: None,
            cache_dir: None,
        }
    }
}

/// Loaded model and tokenizer
struct SentenceModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

enum ModelState {
    Uninitialized,
    Ready(Arc<SentenceModel>),
    Failed(String),
}

/// Local embedding provider using Candle for inference
///
/// The model is loaded lazily on the first [`ensure_initialized`] call. The
/// state transition happens under a mutex, so concurrent first calls load
/// the model once and a failed load is remembered.
///
/// [`ensure_initialized`]: EmbeddingProvider::ensure_initialized
pub struct LocalProvider {
    config: LocalProviderConfig,
    device: Option<Device>,
    state: Mutex<ModelState>,
    load_attempts: AtomicUsize,
}

impl LocalProvider {
    /// Create a provider on the best available device
    ///
    /// The device probe runs once per process; if it fails the provider
    /// reports itself unavailable.
    pub fn new(config: LocalProviderConfig) -> Self {
        let device = DEVICE_PROBE
            .get_or_init(|| match select_device() {
                Ok(device) => Some(device),
                Err(e) => {
                    warn!("No usable inference device: {}", e);
                    None
                }
            })
            .clone();

        Self {
            config,
            device,
            state: Mutex::new(ModelState::Uninitialized),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Create with a specific device
    pub fn with_device(config: LocalProviderConfig, device: Device) -> Self {
        Self {
            config,
            device: Some(device),
            state: Mutex::new(ModelState::Uninitialized),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Number of times model loading has been attempted
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::Relaxed)
    }

    pub fn model_id(&self) -> &str {
        &self.config.model_id
    }

    /// Current model lifecycle state
    pub fn model_status(&self) -> ModelStatus {
        match &*self.state.lock() {
            ModelState::Uninitialized => ModelStatus::Uninitialized,
            ModelState::Ready(_) => ModelStatus::Ready,
            ModelState::Failed(_) => ModelStatus::Failed,
        }
    }

    fn device_name(&self) -> String {
        match &self.device {
            None => "N/A".to_string(),
            Some(Device::Cpu) => "CPU".to_string(),
            #[cfg(feature = "metal")]
            Some(Device::Metal(_)) => "Metal".to_string(),
            #[cfg(feature = "cuda")]
            Some(Device::Cuda(_)) => "CUDA".to_string(),
            #[allow(unreachable_patterns)]
            Some(_) => "Unknown".to_string(),
        }
    }

    fn loaded_model(&self) -> Option<Arc<SentenceModel>> {
        match &*self.state.lock() {
            ModelState::Ready(model) => Some(Arc::clone(model)),
            _ => None,
        }
    }
}

impl EmbeddingProvider for LocalProvider {
    fn is_available(&self) -> bool {
        self.device.is_some()
    }

    fn ensure_initialized(&self) -> bool {
        let Some(device) = &self.device else {
            return false;
        };

        let mut state = self.state.lock();
        match &*state {
            ModelState::Ready(_) => return true,
            ModelState::Failed(_) => return false,
            ModelState::Uninitialized => {}
        }

        self.load_attempts.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        match load_model(&self.config, device) {
            Ok(model) => {
                info!(
                    "Loaded embedding model {} in {:?}",
                    self.config.model_id,
                    start.elapsed()
                );
                *state = ModelState::Ready(Arc::new(model));
                true
            }
            Err(e) => {
                error!(
                    "Failed to initialize embedding model {}: {}",
                    self.config.model_id, e
                );
                *state = ModelState::Failed(e.to_string());
                false
            }
        }
    }

    fn embed(&self, text: &str) -> Option<Embedding> {
        let Some(model) = self.loaded_model() else {
            debug!("embed() called before the model was initialized");
            return None;
        };

        match encode(&model, text) {
            Ok(values) => Some(Embedding::from(values)),
            Err(e) => {
                warn!("Error generating embedding for text: {}", e);
                None
            }
        }
    }

    fn status(&self) -> ProviderStatus {
        let error = match &*self.state.lock() {
            ModelState::Failed(message) => Some(message.clone()),
            _ if self.device.is_none() => Some("No usable inference device".to_string()),
            _ => None,
        };

        ProviderStatus {
            available: self.is_available(),
            model: self.model_status(),
            model_id: self.config.model_id.clone(),
            device: self.device_name(),
            error,
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Select the best available device for inference
fn select_device() -> Result<Device> {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Using Metal/MPS GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                debug!("Metal not available: {}", e);
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                debug!("CUDA not available: {}", e);
            }
        }
    }

    debug!("Using CPU for embedding inference");
    Ok(Device::Cpu)
}

/// Locate `config.json`, `tokenizer.json` and `model.safetensors`
fn resolve_model_files(config: &LocalProviderConfig) -> Result<(PathBuf, PathBuf, PathBuf)> {
    if let Some(dir) = &config.model_dir {
        let files = (
            dir.join("config.json"),
            dir.join("tokenizer.json"),
            dir.join("model.safetensors"),
        );
        for path in [&files.0, &files.1, &files.2] {
            if !path.exists() {
                return Err(SearchError::ProviderUnavailable(format!(
                    "Model file missing: {}",
                    path.display()
                )));
            }
        }
        return Ok(files);
    }

    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(cache_dir) = &config.cache_dir {
        builder = builder.with_cache_dir(cache_dir.clone());
    }
    let api = builder
        .build()
        .map_err(|e| SearchError::Embedding(format!("Failed to create HF API: {}", e)))?;
    let repo = Repo::with_revision(
        config.model_id.clone(),
        RepoType::Model,
        config.revision.clone(),
    );
    let api_repo = api.repo(repo);

    let download = |file: &str| {
        api_repo
            .get(file)
            .map_err(|e| SearchError::Embedding(format!("Failed to download {}: {}", file, e)))
    };

    Ok((
        download("config.json")?,
        download("tokenizer.json")?,
        download("model.safetensors")?,
    ))
}

#[derive(Deserialize)]
struct ModelLimits {
    #[serde(default = "default_max_positions")]
    max_position_embeddings: usize,
}

fn default_max_positions() -> usize {
    DEFAULT_MAX_POSITIONS
}

/// Load model weights and a tokenizer configured for single-sentence input
fn load_model(config: &LocalProviderConfig, device: &Device) -> Result<SentenceModel> {
    info!("Loading embedding model ({})...", config.model_id);

    let (config_path, tokenizer_path, weights_path) = resolve_model_files(config)?;

    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| SearchError::Embedding(format!("Failed to read config: {}", e)))?;
    let bert_config: BertConfig = serde_json::from_str(&config_str)
        .map_err(|e| SearchError::Embedding(format!("Failed to parse config: {}", e)))?;
    let limits: ModelLimits = serde_json::from_str(&config_str)?;

    let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| SearchError::Embedding(format!("Failed to load tokenizer: {}", e)))?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: limits.max_position_embeddings,
            ..Default::default()
        }))
        .map_err(|e| SearchError::Embedding(format!("Failed to configure truncation: {}", e)))?;
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, device)
            .map_err(|e| SearchError::Embedding(format!("Failed to load weights: {}", e)))?
    };

    let model = BertModel::load(vb, &bert_config)
        .map_err(|e| SearchError::Embedding(format!("Failed to create model: {}", e)))?;

    debug!(
        "Embedding model ready (max input {} tokens)",
        limits.max_position_embeddings
    );

    Ok(SentenceModel {
        model,
        tokenizer,
        device: device.clone(),
    })
}

/// Mean pooling with attention mask
///
/// Padding positions contribute nothing; the divisor is the number of real
/// tokens, clamped away from zero.
fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;

    let summed = embeddings.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.maximum(MEAN_POOL_MIN_TOKENS)?;

    summed
        .broadcast_div(&counts)
        .map_err(|e| SearchError::Embedding(format!("Mean pooling failed: {}", e)))
}

/// Encode one text into a sentence vector
fn encode(model: &SentenceModel, text: &str) -> Result<Vec<f32>> {
    let encoding = model
        .tokenizer
        .encode(text, true)
        .map_err(|e| SearchError::Embedding(format!("Tokenization failed: {}", e)))?;

    let token_ids = Tensor::new(encoding.get_ids(), &model.device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(encoding.get_attention_mask(), &model.device)?.unsqueeze(0)?;
    let token_type_ids = token_ids.zeros_like()?;

    let hidden = model
        .model
        .forward(&token_ids, &token_type_ids, Some(&attention_mask))
        .map_err(|e| SearchError::Embedding(format!("Forward pass failed: {}", e)))?;

    let pooled = mean_pool(&hidden, &attention_mask)?;
    Ok(pooled.squeeze(0)?.to_vec1::<f32>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_model_config() -> LocalProviderConfig {
        LocalProviderConfig {
            model_dir: Some(PathBuf::from("/nonexistent/surveylens-test-model")),
            ..Default::default()
        }
    }

    #[test]
    fn test_device_selection() {
        assert!(select_device().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = LocalProviderConfig::default();
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.revision, "main");
        assert!(config.model_dir.is_none());
    }

    #[test]
    fn test_cpu_provider_is_available() {
        let provider = LocalProvider::with_device(LocalProviderConfig::default(), Device::Cpu);
        assert!(provider.is_available());
        assert_eq!(provider.model_status(), ModelStatus::Uninitialized);
        assert_eq!(provider.status().device, "CPU");
    }

    #[test]
    fn test_embed_before_initialization_is_none() {
        let provider = LocalProvider::with_device(LocalProviderConfig::default(), Device::Cpu);
        assert!(provider.embed("hello").is_none());
    }

    #[test]
    fn test_failed_initialization_is_cached() {
        let provider = LocalProvider::with_device(missing_model_config(), Device::Cpu);

        assert!(!provider.ensure_initialized());
        assert_eq!(provider.model_status(), ModelStatus::Failed);

        // Second call returns the cached failure
        assert!(!provider.ensure_initialized());
        assert!(provider.embed("hello").is_none());

        let status = provider.status();
        assert!(status.available);
        assert_eq!(status.model, ModelStatus::Failed);
        assert!(status.error.unwrap().contains("Model file missing"));
    }

    #[test]
    fn test_concurrent_initialization_fails_once() {
        let provider = LocalProvider::with_device(missing_model_config(), Device::Cpu);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert!(!provider.ensure_initialized()));
            }
        });

        assert_eq!(provider.load_attempts(), 1);
        assert_eq!(provider.model_status(), ModelStatus::Failed);
        assert!(provider.status().error.unwrap().contains("Model file missing"));
    }

    #[test]
    fn test_mean_pool_ignores_padding() {
        let device = Device::Cpu;
        // (batch=1, tokens=3, dim=2); last token is padding
        let hidden = Tensor::new(&[[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]], &device).unwrap();
        let mask = Tensor::new(&[[1u32, 1, 0]], &device).unwrap();

        let pooled = mean_pool(&hidden, &mask).unwrap();
        let values = pooled.squeeze(0).unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[test]
    fn test_mean_pool_all_padding_is_finite() {
        let device = Device::Cpu;
        let hidden = Tensor::new(&[[[5.0f32, -5.0], [7.0, 7.0]]], &device).unwrap();
        let mask = Tensor::new(&[[0u32, 0]], &device).unwrap();

        let pooled = mean_pool(&hidden, &mask).unwrap();
        let values = pooled.squeeze(0).unwrap().to_vec1::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 0.0]);
    }

    #[test]
    #[ignore] // Requires model download
    fn test_semantic_encoding() {
        let provider = LocalProvider::new(LocalProviderConfig::default());
        assert!(provider.ensure_initialized());

        let embedding = provider.embed("How satisfied are you with your job?").unwrap();
        assert_eq!(embedding.dim(), EMBEDDING_DIM);

        let similar = provider.embed("Are you happy at work?").unwrap();
        let unrelated = provider.embed("What is your favorite color?").unwrap();
        let close = crate::cosine_similarity(embedding.as_slice(), similar.as_slice());
        let far = crate::cosine_similarity(embedding.as_slice(), unrelated.as_slice());
        assert!(close > far);
    }
}
