//! CLI command implementations

pub mod compare;
pub mod import;
pub mod search;
pub mod show;
pub mod status;
pub mod surveys;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use surveylens_config::{ConfigLoader, ConfigOverrides, SurveyLensConfig};
use surveylens_search::{
    CachedProvider, DisabledProvider, EmbeddingProvider, LocalProvider, LocalProviderConfig,
};
use surveylens_store::SqliteStore;

use crate::GlobalOptions;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Directory relative config and database paths resolve against.
pub fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

/// Build the config loader, honoring `--config`.
pub fn config_loader(global: &GlobalOptions) -> ConfigLoader {
    let loader = ConfigLoader::new();
    match global.config {
        Some(ref path) => loader.with_config_file(path),
        None => loader,
    }
}

/// Load and validate configuration with the given overrides applied.
pub fn load_config(global: &GlobalOptions, overrides: ConfigOverrides) -> Result<SurveyLensConfig> {
    let root = working_dir()?;
    let config = config_loader(global)
        .load(&root, Some(&overrides))
        .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Open the configured survey database.
pub fn open_store(config: &SurveyLensConfig) -> Result<Arc<SqliteStore>> {
    let path = config.database_path(&working_dir()?);
    let store = SqliteStore::open(&path)
        .with_context(|| format!("Failed to open survey database {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Build the embedding provider described by the configuration.
///
/// Nothing is loaded here; the model is fetched on the first semantic search.
pub fn build_provider(config: &SurveyLensConfig) -> Arc<dyn EmbeddingProvider> {
    if !config.embedding.enabled {
        return Arc::new(DisabledProvider::new(
            "semantic search disabled in configuration",
        ));
    }

    let provider = LocalProvider::new(LocalProviderConfig {
        model_id: config.embedding.model_id.clone(),
        revision: config.embedding.revision.clone(),
        model_dir: config.embedding.model_dir.clone(),
        cache_dir: config.embedding.cache_dir.clone(),
    });

    CachedProvider::wrap(Arc::new(provider), config.search.cache_capacity)
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_match_search_defaults() {
        let config = SurveyLensConfig::default();
        assert_eq!(surveylens_config::DEFAULT_MODEL_ID, surveylens_search::DEFAULT_MODEL_ID);
        assert_eq!(surveylens_config::DEFAULT_THRESHOLD, surveylens_search::DEFAULT_THRESHOLD);
        assert_eq!(config.embedding.revision, surveylens_search::DEFAULT_REVISION);
    }

    #[test]
    fn test_disabled_config_builds_unavailable_provider() {
        let mut config = SurveyLensConfig::default();
        config.embedding.enabled = false;
        assert!(!build_provider(&config).is_available());
    }
}
