//! Compare command - Two surveys side by side

use anyhow::{Context, Result};
use clap::Args;
use surveylens_store::{compare_surveys, SurveyDetail};

use super::{load_config, open_store, OutputFormat};
use crate::GlobalOptions;

/// Arguments for the compare command
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First survey ID
    survey1: Option<i64>,

    /// Second survey ID
    survey2: Option<i64>,

    /// Output format: text (default), json
    #[arg(long, short = 'o', default_value = "text")]
    output: OutputFormat,
}

/// Execute the compare command
pub async fn execute(args: CompareArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global, global.to_config_overrides())?;
    let store = open_store(&config)?;

    let comparison = compare_surveys(store.as_ref(), args.survey1, args.survey2).map_err(|e| {
        if e.is_client_error() {
            anyhow::Error::new(e)
        } else {
            anyhow::Error::new(e).context("Comparison failed")
        }
    })?;

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&comparison)
                .context("Failed to serialize comparison")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_side(&comparison.survey1);
            println!();
            print_side(&comparison.survey2);
        }
    }

    Ok(())
}

fn print_side(survey: &SurveyDetail) {
    println!("== {} (#{}) ==", survey.name, survey.id);
    for question in &survey.questions {
        println!("  {}. {}", question.question_number, question.text);
        for option in &question.options {
            println!("     - {}", option);
        }
    }
}
