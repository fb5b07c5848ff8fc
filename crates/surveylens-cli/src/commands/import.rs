//! Import command - Load surveys from a JSON file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use surveylens_store::NewSurvey;
use tracing::debug;

use super::{load_config, open_store};
use crate::GlobalOptions;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file holding one survey object or an array of them
    file: PathBuf,
}

/// Execute the import command
pub async fn execute(args: ImportArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, global.to_config_overrides())?;

    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let surveys = NewSurvey::many_from_json(&json)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    debug!("Parsed {} surveys from {:?}", surveys.len(), args.file);

    let store = open_store(&config)?;
    for survey in &surveys {
        let id = store
            .import(survey)
            .with_context(|| format!("Failed to import survey '{}'", survey.name))?;
        if !global.quiet {
            println!("Imported survey '{}' (id {})", survey.name, id);
        }
    }

    Ok(())
}
