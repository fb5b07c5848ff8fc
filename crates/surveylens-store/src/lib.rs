//! SurveyLens Store - Survey definitions persisted in SQLite
//!
//! Holds surveys, their numbered questions and each question's answer
//! options, and exposes the read API the search engine scans:
//!
//! - [`SurveyRepository::list_all_questions`] - every question with its survey
//!   name and ordered option texts
//! - [`SurveyRepository::list_all_options`] - every option with its resolved
//!   parent question
//!
//! Survey comparison lives in [`compare`].
//!
//! # Example
//!
//! ```ignore
//! use surveylens_store::{NewSurvey, SqliteStore, SurveyRepository};
//!
//! let store = SqliteStore::in_memory()?;
//! store.import(&NewSurvey::from_json(r#"{"name": "Colors", "questions": []}"#)?)?;
//!
//! for question in store.list_all_questions()? {
//!     println!("{} {}", question.question_number, question.text);
//! }
//! ```

pub mod compare;
mod error;
pub mod model;
mod repository;
pub mod schema;
mod sqlite;

pub use compare::{compare_surveys, CompareError, SurveyComparison};
pub use error::{Result, StoreError};
pub use model::{
    NewQuestion, NewSurvey, OptionRecord, QuestionRecord, QuestionSummary, SurveyDetail,
    SurveySummary,
};
pub use repository::SurveyRepository;
pub use sqlite::{SqliteStore, StoreStats};
