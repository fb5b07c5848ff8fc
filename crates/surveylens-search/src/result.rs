//! Search result types
//!
//! A result is either a question match or an option match. Option matches
//! describe the option's parent question and add the matched option text.
//! `similarity` is only set by the semantic path, so its absence on a
//! result means keyword search produced it.

use serde::Serialize;
use surveylens_store::{OptionRecord, QuestionRecord};

/// Which part of the survey matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Question,
    Option,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Question => write!(f, "question"),
            MatchType::Option => write!(f, "option"),
        }
    }
}

/// Fields shared by both result variants, always describing a question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedQuestion {
    pub survey_id: i64,
    pub survey_name: String,
    pub question_id: i64,
    pub question_number: String,
    pub text: String,
    pub options: Vec<String>,
}

impl From<QuestionRecord> for MatchedQuestion {
    fn from(question: QuestionRecord) -> Self {
        Self {
            survey_id: question.survey_id,
            survey_name: question.survey_name,
            question_id: question.id,
            question_number: question.question_number,
            text: question.text,
            options: question.options,
        }
    }
}

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "match_type")]
pub enum SearchResult {
    /// The question text itself matched
    #[serde(rename = "question")]
    QuestionMatch {
        #[serde(flatten)]
        question: MatchedQuestion,
        #[serde(skip_serializing_if = "Option::is_none")]
        similarity: Option<f32>,
    },
    /// One of the question's options matched
    #[serde(rename = "option")]
    OptionMatch {
        #[serde(flatten)]
        question: MatchedQuestion,
        matched_option: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        similarity: Option<f32>,
    },
}

impl SearchResult {
    /// Result for a matching question
    pub fn question(record: QuestionRecord, similarity: Option<f32>) -> Self {
        SearchResult::QuestionMatch {
            question: record.into(),
            similarity,
        }
    }

    /// Result for a matching option, described by its parent question
    pub fn option(record: OptionRecord, similarity: Option<f32>) -> Self {
        SearchResult::OptionMatch {
            question: record.question.into(),
            matched_option: record.text,
            similarity,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            SearchResult::QuestionMatch { .. } => MatchType::Question,
            SearchResult::OptionMatch { .. } => MatchType::Option,
        }
    }

    /// The question this result describes
    pub fn matched_question(&self) -> &MatchedQuestion {
        match self {
            SearchResult::QuestionMatch { question, .. }
            | SearchResult::OptionMatch { question, .. } => question,
        }
    }

    /// Matched option text for option matches
    pub fn matched_option(&self) -> Option<&str> {
        match self {
            SearchResult::QuestionMatch { .. } => None,
            SearchResult::OptionMatch { matched_option, .. } => Some(matched_option),
        }
    }

    pub fn similarity(&self) -> Option<f32> {
        match self {
            SearchResult::QuestionMatch { similarity, .. }
            | SearchResult::OptionMatch { similarity, .. } => *similarity,
        }
    }

    /// Whether semantic scoring produced this result
    pub fn nlp_used(&self) -> bool {
        self.similarity().is_some()
    }
}

/// A result as handed to request layers, with the derived `nlp_used` flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub result: SearchResult,
    pub nlp_used: bool,
}

impl From<SearchResult> for SearchHit {
    fn from(result: SearchResult) -> Self {
        let nlp_used = result.nlp_used();
        Self { result, nlp_used }
    }
}
