//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.surveylens/config.toml`
//! 2. Local config: `.surveylens/config.toml` (in the working directory)
//! 3. Explicit config file (`--config`), if given
//! 4. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    ConfigOverrides, EmbeddingConfig, LogFormat, LoggingConfig, SearchConfig, StorageConfig,
    SurveyLensConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".surveylens";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".surveylens";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.surveylens`)
    global_config_dir: Option<PathBuf>,

    /// Config file named on the command line
    explicit_file: Option<PathBuf>,

    /// Cached global config
    global_config: Option<SurveyLensConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.surveylens`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            explicit_file: None,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            explicit_file: None,
            global_config: None,
        }
    }

    /// Merge `path` after the local config. Unlike the global and local
    /// files, it must exist.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a working directory.
    pub fn local_config_path(&self, root: &Path) -> PathBuf {
        root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Explicit config file, if one was given.
    pub fn explicit_config_path(&self) -> Option<&Path> {
        self.explicit_file.as_deref()
    }

    /// Load configuration for a working directory with optional CLI overrides.
    ///
    /// Merges config in order: global → local → explicit file → overrides.
    pub fn load(
        &mut self,
        root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<SurveyLensConfig, ConfigError> {
        let mut config = SurveyLensConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ref path) = self.explicit_file {
            debug!("Loading config from {:?}", path);
            config = merge_configs(config, load_config_file(path)?);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<SurveyLensConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a working directory.
    pub fn load_local(&self, root: &Path) -> Result<Option<SurveyLensConfig>, ConfigError> {
        let local_path = self.local_config_path(root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<SurveyLensConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// Overlay fields still at their default value keep the base value, so a
/// partial file only changes what it sets.
fn merge_configs(base: SurveyLensConfig, overlay: SurveyLensConfig) -> SurveyLensConfig {
    SurveyLensConfig {
        storage: merge_storage(base.storage, overlay.storage),
        embedding: merge_embedding(base.embedding, overlay.embedding),
        search: merge_search(base.search, overlay.search),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

fn merge_storage(base: StorageConfig, overlay: StorageConfig) -> StorageConfig {
    let default = StorageConfig::default();
    StorageConfig {
        database: if overlay.database != default.database {
            overlay.database
        } else {
            base.database
        },
    }
}

fn merge_embedding(base: EmbeddingConfig, overlay: EmbeddingConfig) -> EmbeddingConfig {
    let default = EmbeddingConfig::default();
    EmbeddingConfig {
        // Disabling anywhere wins
        enabled: base.enabled && overlay.enabled,
        model_id: if overlay.model_id != default.model_id {
            overlay.model_id
        } else {
            base.model_id
        },
        revision: if overlay.revision != default.revision {
            overlay.revision
        } else {
            base.revision
        },
        model_dir: overlay.model_dir.or(base.model_dir),
        cache_dir: overlay.cache_dir.or(base.cache_dir),
    }
}

fn merge_search(base: SearchConfig, overlay: SearchConfig) -> SearchConfig {
    let default = SearchConfig::default();
    SearchConfig {
        threshold: if overlay.threshold != default.threshold {
            overlay.threshold
        } else {
            base.threshold
        },
        cache_capacity: if overlay.cache_capacity != default.cache_capacity {
            overlay.cache_capacity
        } else {
            base.cache_capacity
        },
    }
}

fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
        format: if overlay.format != LogFormat::Text {
            overlay.format
        } else {
            base.format
        },
        file: overlay.file.or(base.file),
    }
}
