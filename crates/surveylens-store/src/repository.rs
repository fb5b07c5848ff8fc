//! Read API consumed by search and comparison

use crate::error::Result;
use crate::model::{OptionRecord, QuestionRecord, SurveyDetail, SurveySummary};

/// Read-only view over the survey corpus
///
/// Both scans must return records in a stable order so that keyword search
/// output is reproducible between calls on unchanged data.
pub trait SurveyRepository: Send + Sync {
    /// All questions, each with its survey name and ordered option texts
    fn list_all_questions(&self) -> Result<Vec<QuestionRecord>>;

    /// All options, each with its resolved parent question
    fn list_all_options(&self) -> Result<Vec<OptionRecord>>;

    /// All surveys with question counts
    fn list_surveys(&self) -> Result<Vec<SurveySummary>>;

    /// One survey with its questions, or `None` if it does not exist
    fn get_survey(&self, id: i64) -> Result<Option<SurveyDetail>>;
}
