//! Common test utilities for surveylens-store integration tests.

use std::path::PathBuf;

use surveylens_store::{NewSurvey, SqliteStore};

/// Path to the shared survey fixture file
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("surveys.json")
}

/// Parse the shared fixture file
pub fn fixture_surveys() -> Vec<NewSurvey> {
    let json = std::fs::read_to_string(fixture_path()).expect("Failed to read fixture");
    NewSurvey::many_from_json(&json).expect("Failed to parse fixture")
}

/// Import every fixture survey into a store
pub fn seed(store: &SqliteStore) -> Vec<i64> {
    fixture_surveys()
        .iter()
        .map(|survey| store.import(survey).expect("Failed to import survey"))
        .collect()
}
