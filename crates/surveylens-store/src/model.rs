//! Survey data model
//!
//! Records returned by the read API carry their back-references already
//! resolved: a [`QuestionRecord`] knows its survey's name and option texts,
//! an [`OptionRecord`] owns a copy of its parent question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A question as seen by the search engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question ID
    pub id: i64,
    /// Owning survey ID
    pub survey_id: i64,
    /// Owning survey name
    pub survey_name: String,
    /// Short label such as "Q1" or "3a"
    pub question_number: String,
    /// Question body
    pub text: String,
    /// Option texts in stored order
    pub options: Vec<String>,
}

/// An answer option together with its parent question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    /// Option ID
    pub id: i64,
    /// Option body
    pub text: String,
    /// Parent question (transitively carries the survey)
    pub question: QuestionRecord,
}

impl OptionRecord {
    /// ID of the owning question
    pub fn question_id(&self) -> i64 {
        self.question.id
    }
}

/// One row of the survey listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub question_count: usize,
}

/// Question as shown inside a survey detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub question_number: String,
    pub text: String,
    pub options: Vec<String>,
}

/// A full survey with its questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDetail {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionSummary>,
}

/// Survey to be imported
///
/// Mirrors the JSON fixture format:
///
/// ```json
/// {
///   "name": "Colors",
///   "questions": [
///     { "question_number": "Q1", "text": "What is your favorite color?",
///       "options": ["Red", "Blue", "Green"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurvey {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<NewQuestion>,
}

/// Question to be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question_number: String,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl NewSurvey {
    /// Create an empty survey with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            questions: Vec::new(),
        }
    }

    /// Append a question (builder style)
    pub fn question<I, S>(
        mut self,
        question_number: impl Into<String>,
        text: impl Into<String>,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.questions.push(NewQuestion {
            question_number: question_number.into(),
            text: text.into(),
            options: options.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Parse a single survey from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a fixture file holding either one survey or an array of surveys
    pub fn many_from_json(json: &str) -> Result<Vec<Self>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<NewSurvey>),
            One(NewSurvey),
        }

        Ok(match serde_json::from_str(json)? {
            OneOrMany::Many(surveys) => surveys,
            OneOrMany::One(survey) => vec![survey],
        })
    }
}
