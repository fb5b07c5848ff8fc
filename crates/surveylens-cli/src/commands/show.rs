//! Show command - One survey in detail

use anyhow::{Context, Result};
use clap::Args;
use surveylens_store::SurveyRepository;

use super::{load_config, open_store, OutputFormat};
use crate::GlobalOptions;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Survey ID
    id: i64,

    /// Output format: text (default), json
    #[arg(long, short = 'o', default_value = "text")]
    output: OutputFormat,
}

/// Execute the show command
pub async fn execute(args: ShowArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, global.to_config_overrides())?;
    let store = open_store(&config)?;

    let Some(survey) = store.get_survey(args.id).context("Failed to load survey")? else {
        anyhow::bail!("Survey not found: {}", args.id);
    };

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&survey).context("Failed to serialize survey")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!("{} (#{})", survey.name, survey.id);
            println!("Created: {}", survey.created_at.to_rfc3339());
            if let Some(updated_at) = survey.updated_at {
                println!("Updated: {}", updated_at.to_rfc3339());
            }
            println!();
            for question in &survey.questions {
                println!("{}. {}", question.question_number, question.text);
                for option in &question.options {
                    println!("   - {}", option);
                }
            }
        }
    }

    Ok(())
}
