//! SurveyLens CLI - Survey storage, comparison and semantic search
//!
//! # Usage
//!
//! ```bash
//! # Load surveys from a JSON file
//! surveylens import surveys.json
//!
//! # Semantic search (falls back to keyword matching when unavailable)
//! surveylens search "how happy are people at work"
//!
//! # Plain substring search
//! surveylens search blue --keyword
//!
//! # Compare two surveys side by side
//! surveylens compare 1 2
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use surveylens_config::{ConfigOverrides, LogFormat, LoggingConfig};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// SurveyLens - Search and compare survey questions
#[derive(Parser, Debug)]
#[command(name = "surveylens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Path to the survey database
    #[arg(long, short = 'd', global = true, env = "SURVEYLENS_DATABASE")]
    database: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "SURVEYLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Disable semantic search for this invocation
    #[arg(long, global = true)]
    no_semantic: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database: self.database.clone(),
            semantic_enabled: self.no_semantic.then_some(false),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search questions and options
    Search(commands::search::SearchArgs),

    /// Show two surveys side by side
    Compare(commands::compare::CompareArgs),

    /// List surveys
    Surveys(commands::surveys::SurveysArgs),

    /// Show one survey with its questions
    Show(commands::show::ShowArgs),

    /// Import surveys from a JSON file
    Import(commands::import::ImportArgs),

    /// Show configuration, database and model status
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself
    let logging = commands::load_config(&cli.global, cli.global.to_config_overrides())
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&cli.global, &logging)?;

    match cli.command {
        Commands::Search(args) => commands::search::execute(args, cli.global).await,
        Commands::Compare(args) => commands::compare::execute(args, cli.global).await,
        Commands::Surveys(args) => commands::surveys::execute(args, cli.global).await,
        Commands::Show(args) => commands::show::execute(args, cli.global).await,
        Commands::Import(args) => commands::import::execute(args, cli.global).await,
        Commands::Status(args) => commands::status::execute(args, cli.global).await,
    }
}

/// Install the global tracing subscriber
///
/// `--quiet`/`--verbose` win over `RUST_LOG`, which wins over `logging.level`.
fn init_logging(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let filter = if global.quiet {
        EnvFilter::new("error")
    } else if global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let writer = match logging.file {
        Some(ref path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = logging.file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()?,
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(ansi),
            )
            .try_init()?,
    }

    Ok(())
}
