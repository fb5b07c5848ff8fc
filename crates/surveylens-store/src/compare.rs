//! Side-by-side survey comparison

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::StoreError;
use crate::model::SurveyDetail;
use crate::repository::SurveyRepository;

/// Errors returned by [`compare_surveys`]
#[derive(Error, Debug)]
pub enum CompareError {
    /// One or both survey IDs were not supplied
    #[error("Both survey IDs are required")]
    MissingIdentifier,

    /// A supplied survey ID does not exist
    #[error("Survey not found: {0}")]
    NotFound(i64),

    /// Storage failed while loading a survey
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CompareError {
    /// Whether the error was caused by the request rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingIdentifier | Self::NotFound(_))
    }
}

/// Two surveys loaded for comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyComparison {
    pub survey1: SurveyDetail,
    pub survey2: SurveyDetail,
}

/// Load two surveys for side-by-side display
///
/// IDs are optional so request layers can pass through whatever they parsed;
/// a missing ID is reported before anything is read.
pub fn compare_surveys(
    repository: &dyn SurveyRepository,
    first: Option<i64>,
    second: Option<i64>,
) -> Result<SurveyComparison, CompareError> {
    let (Some(first), Some(second)) = (first, second) else {
        return Err(CompareError::MissingIdentifier);
    };

    let survey1 = repository
        .get_survey(first)?
        .ok_or(CompareError::NotFound(first))?;
    let survey2 = repository
        .get_survey(second)?
        .ok_or(CompareError::NotFound(second))?;

    Ok(SurveyComparison { survey1, survey2 })
}
