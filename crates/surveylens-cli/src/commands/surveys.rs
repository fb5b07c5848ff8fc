//! Surveys command - List stored surveys

use anyhow::{Context, Result};
use clap::Args;
use surveylens_store::SurveyRepository;

use super::{load_config, open_store, print_info, OutputFormat};
use crate::GlobalOptions;

/// Arguments for the surveys command
#[derive(Args, Debug)]
pub struct SurveysArgs {
    /// Output format: text (default), json
    #[arg(long, short = 'o', default_value = "text")]
    output: OutputFormat,
}

/// Execute the surveys command
pub async fn execute(args: SurveysArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, global.to_config_overrides())?;
    let store = open_store(&config)?;
    let surveys = store.list_surveys().context("Failed to list surveys")?;

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&surveys).context("Failed to serialize surveys")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if surveys.is_empty() {
                print_info("No surveys found. Load some with `surveylens import`.", global.quiet);
                return Ok(());
            }

            println!("{:>4}  {:<40}  {:>9}  {}", "ID", "NAME", "QUESTIONS", "CREATED");
            for survey in &surveys {
                println!(
                    "{:>4}  {:<40}  {:>9}  {}",
                    survey.id,
                    survey.name,
                    survey.question_count,
                    survey.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }

    Ok(())
}
