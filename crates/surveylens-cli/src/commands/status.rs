//! Status command - Show configuration, database and model status

use anyhow::{Context, Result};
use clap::Args;
use super::{build_provider, config_loader, load_config, open_store, working_dir, OutputFormat};
use crate::GlobalOptions;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Load the embedding model to check that semantic search works
    #[arg(long)]
    load_model: bool,

    /// Output format: text (default), json
    #[arg(long, short = 'o', default_value = "text")]
    output: OutputFormat,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, global: GlobalOptions) -> Result<()> {
    let root = working_dir()?;
    let config = load_config(&global, global.to_config_overrides())?;
    let loader = config_loader(&global);
    let database_path = config.database_path(&root);

    let stats = if database_path.exists() {
        Some(open_store(&config)?.stats().context("Failed to read database")?)
    } else {
        None
    };

    let provider = build_provider(&config);
    if args.load_model {
        let provider = provider.clone();
        tokio::task::spawn_blocking(move || provider.ensure_initialized())
            .await
            .context("Model loading task failed")?;
    }
    let embedding = provider.status();

    if matches!(args.output, OutputFormat::Json) {
        let mut status = serde_json::json!({
            "config": {
                "global": loader.global_config_path(),
                "local": loader.local_config_path(&root),
                "explicit": loader.explicit_config_path(),
            },
            "database": {
                "path": database_path,
                "exists": stats.is_some(),
            },
            "search": {
                "threshold": config.search.threshold,
                "cache_capacity": config.search.cache_capacity,
            },
            "embedding": embedding,
        });

        if let Some(stats) = stats {
            status["database"]["surveys"] = stats.surveys.into();
            status["database"]["questions"] = stats.questions.into();
            status["database"]["options"] = stats.options.into();
        }

        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("SurveyLens Status");
    println!("=================");
    println!();

    println!("Configuration:");
    match loader.global_config_path() {
        Some(path) => println!("  Global:   {}", path.display()),
        None => println!("  Global:   (no home directory)"),
    }
    println!("  Local:    {}", loader.local_config_path(&root).display());
    if let Some(path) = loader.explicit_config_path() {
        println!("  Explicit: {}", path.display());
    }
    println!();

    println!("Database: {}", database_path.display());
    match stats {
        Some(stats) => {
            println!("  Surveys:   {}", stats.surveys);
            println!("  Questions: {}", stats.questions);
            println!("  Options:   {}", stats.options);
        }
        None => println!("  (not created yet)"),
    }
    println!();

    println!("Semantic search:");
    println!(
        "  Available: {}",
        if embedding.available { "yes" } else { "no" }
    );
    println!("  Model:     {} ({})", embedding.model_id, embedding.model);
    println!("  Device:    {}", embedding.device);
    println!("  Threshold: {}", config.search.threshold);
    if let Some(ref error) = embedding.error {
        println!("  Error:     {}", error);
    }

    Ok(())
}
