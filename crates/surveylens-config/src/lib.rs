//! SurveyLens Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.surveylens/config.toml`
//! - Local config: `.surveylens/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Both constants mirror surveylens-search, which this crate does not depend on.

/// Sentence embedding model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Minimum cosine similarity for a semantic match.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

/// Root configuration for SurveyLens.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SurveyLensConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Embedding model configuration
    pub embedding: EmbeddingConfig,

    /// Search tuning
    pub search: SearchConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Where survey data lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file (relative paths resolve against the working directory)
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(".surveylens/surveys.db"),
        }
    }
}

/// Embedding model configuration.
///
/// # Example TOML
///
/// ```toml
/// [embedding]
/// enabled = true
/// model_id = "sentence-transformers/all-MiniLM-L6-v2"
/// revision = "main"
/// # model_dir = "/opt/models/minilm"   # skip the hub download
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Turn semantic search off entirely
    pub enabled: bool,

    /// HuggingFace model id
    pub model_id: String,

    /// Model revision (branch, tag or commit)
    pub revision: String,

    /// Local directory holding `config.json`, `tokenizer.json` and
    /// `model.safetensors`; bypasses the hub when set
    pub model_dir: Option<PathBuf>,

    /// HuggingFace cache directory override
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: "main".to_string(),
            model_dir: None,
            cache_dir: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_id.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "embedding.model_id",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Search tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum cosine similarity for a semantic match
    pub threshold: f32,

    /// Embedding cache entries (0 = recompute every embedding on every query)
    pub cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cache_capacity: 0,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::invalid_value(
                "search.threshold",
                format!("{} is outside [-1, 1]", self.threshold),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,

    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override database path
    pub database: Option<PathBuf>,

    /// Override semantic search switch
    pub semantic_enabled: Option<bool>,

    /// Override similarity threshold
    pub threshold: Option<f32>,

    /// Override log level
    pub log_level: Option<String>,
}

impl SurveyLensConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref database) = overrides.database {
            self.storage.database = database.clone();
        }

        if let Some(enabled) = overrides.semantic_enabled {
            self.embedding.enabled = enabled;
        }

        if let Some(threshold) = overrides.threshold {
            self.search.threshold = threshold;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.embedding.validate()?;
        self.search.validate()?;
        Ok(())
    }

    /// Get the effective database path for a working directory.
    pub fn database_path(&self, root: &Path) -> PathBuf {
        if self.storage.database.is_absolute() {
            self.storage.database.clone()
        } else {
            root.join(&self.storage.database)
        }
    }
}
