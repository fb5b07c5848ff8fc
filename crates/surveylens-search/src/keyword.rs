//! Keyword search
//!
//! Case-insensitive substring matching over question text and option text.
//! Results keep scan order: all matching questions first, then all matching
//! options, each in the order the store returns them.

use surveylens_store::SurveyRepository;
use tracing::info;

use crate::error::Result;
use crate::result::SearchResult;

/// Find questions and options whose text contains `query`, ignoring case
pub fn keyword_search(store: &dyn SurveyRepository, query: &str) -> Result<Vec<SearchResult>> {
    info!("Performing keyword search for query: {}", query);

    let needle = query.to_lowercase();
    let mut results = Vec::new();

    for question in store.list_all_questions()? {
        if contains_ignore_case(&question.text, &needle) {
            results.push(SearchResult::question(question, None));
        }
    }

    for option in store.list_all_options()? {
        if contains_ignore_case(&option.text, &needle) {
            results.push(SearchResult::option(option, None));
        }
    }

    info!("Keyword search found {} results", results.len());
    Ok(results)
}

/// `needle` must already be lowercase
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
