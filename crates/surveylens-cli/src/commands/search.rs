//! Search command - Semantic and keyword survey search

use anyhow::{Context, Result};
use clap::Args;
use surveylens_config::ConfigOverrides;
use surveylens_search::{SearchHit, SearchResult, SurveySearcher};

use super::{build_provider, load_config, open_store, print_info, OutputFormat};
use crate::GlobalOptions;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    query: String,

    /// Substring matching only, skip embeddings
    #[arg(long, short = 'k')]
    keyword: bool,

    /// Minimum cosine similarity for semantic matches (-1.0 - 1.0)
    #[arg(long, short = 't', allow_negative_numbers = true)]
    threshold: Option<f32>,

    /// Output format: text (default), json
    #[arg(long, short = 'o', default_value = "text")]
    output: OutputFormat,
}

/// Execute the search command
pub async fn execute(args: SearchArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(
        &global,
        ConfigOverrides {
            threshold: args.threshold,
            ..global.to_config_overrides()
        },
    )?;
    let store = open_store(&config)?;
    let searcher = SurveySearcher::new(store, build_provider(&config));

    let threshold = config.search.threshold;
    let use_semantic = !args.keyword;
    let query = args.query.clone();

    // Model loading and inference are blocking
    let hits = tokio::task::spawn_blocking(move || {
        searcher.search(&query, use_semantic, threshold)
    })
    .await
    .context("Search task failed")?
    .map_err(|e| {
        if e.is_client_error() {
            anyhow::Error::new(e)
        } else {
            anyhow::Error::new(e).context("Search failed")
        }
    })?;

    if hits.is_empty() && matches!(args.output, OutputFormat::Text) {
        print_info(&format!("No results found for: {}", args.query), global.quiet);
        return Ok(());
    }

    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&hits).context("Failed to serialize results")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if !global.quiet {
                let mode = if hits[0].nlp_used { "semantic" } else { "keyword" };
                println!(
                    "Found {} results for \"{}\" ({}):\n",
                    hits.len(),
                    args.query,
                    mode
                );
            }

            for (i, hit) in hits.iter().enumerate() {
                print_hit(i + 1, hit);
            }
        }
    }

    Ok(())
}

fn print_hit(rank: usize, hit: &SearchHit) {
    let question = hit.result.matched_question();
    match hit.result {
        SearchResult::QuestionMatch { .. } => {
            println!("{}. [question] {}", rank, question.text);
        }
        SearchResult::OptionMatch {
            ref matched_option, ..
        } => {
            println!("{}. [option] {}", rank, matched_option);
            println!("   Question: {}", question.text);
        }
    }
    println!(
        "   Survey: {} (#{})  Question {}",
        question.survey_name, question.survey_id, question.question_number
    );
    if !question.options.is_empty() {
        println!("   Options: {}", question.options.join(", "));
    }
    if let Some(similarity) = hit.result.similarity() {
        println!("   Similarity: {:.3}", similarity);
    }
    println!();
}
