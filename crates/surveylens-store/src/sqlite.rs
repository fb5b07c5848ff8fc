//! SQLite-backed survey store
//!
//! Wraps a single rusqlite connection behind a mutex so the store can be
//! shared across request handlers. All scans are ordered by primary key,
//! which is also insertion order.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::model::{
    NewSurvey, OptionRecord, QuestionRecord, QuestionSummary, SurveyDetail, SurveySummary,
};
use crate::repository::SurveyRepository;
use crate::schema::{
    SCHEMA_CREATE_INDEXES, SCHEMA_CREATE_METADATA, SCHEMA_CREATE_OPTIONS,
    SCHEMA_CREATE_QUESTIONS, SCHEMA_CREATE_SURVEYS, SELECT_OPTIONS, SELECT_QUESTIONS,
    STORE_SCHEMA_VERSION,
};

/// Row counts for status reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub surveys: usize,
    pub questions: usize,
    pub options: usize,
}

/// Survey store over a SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file, creating it and its schema if needed
    ///
    /// Fails with [`StoreError::SchemaVersionMismatch`] if the file was written
    /// by an incompatible version.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;
        Self::create_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
        };

        match store.get_metadata("schema_version")? {
            Some(version) if version == STORE_SCHEMA_VERSION => {}
            Some(version) => {
                return Err(StoreError::SchemaVersionMismatch {
                    expected: STORE_SCHEMA_VERSION.to_string(),
                    found: version,
                });
            }
            None => store.set_metadata("schema_version", STORE_SCHEMA_VERSION)?,
        }

        debug!("Opened survey database at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_connection(&conn)?;
        Self::create_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.set_metadata("schema_version", STORE_SCHEMA_VERSION)?;
        Ok(store)
    }

    fn configure_connection(conn: &Connection) -> SqliteResult<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        Ok(())
    }

    fn create_schema(conn: &Connection) -> SqliteResult<()> {
        conn.execute(SCHEMA_CREATE_SURVEYS, [])?;
        conn.execute(SCHEMA_CREATE_QUESTIONS, [])?;
        conn.execute(SCHEMA_CREATE_OPTIONS, [])?;
        conn.execute(SCHEMA_CREATE_METADATA, [])?;
        conn.execute_batch(SCHEMA_CREATE_INDEXES)?;
        Ok(())
    }

    // =========================================================================
    // Metadata Operations
    // =========================================================================

    /// Get a metadata value
    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM store_metadata WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Set a metadata value
    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO store_metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Insert a survey with its questions and options in one transaction
    ///
    /// Returns the new survey's ID.
    pub fn import(&self, survey: &NewSurvey) -> Result<i64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO surveys (name, created_at) VALUES (?1, ?2)",
            params![survey.name, Utc::now()],
        )?;
        let survey_id = tx.last_insert_rowid();

        {
            let mut insert_question = tx.prepare(
                "INSERT INTO questions (survey_id, question_number, text) VALUES (?1, ?2, ?3)",
            )?;
            let mut insert_option =
                tx.prepare("INSERT INTO options (question_id, text) VALUES (?1, ?2)")?;

            for question in &survey.questions {
                insert_question.execute(params![
                    survey_id,
                    question.question_number,
                    question.text
                ])?;
                let question_id = tx.last_insert_rowid();

                for option in &question.options {
                    insert_option.execute(params![question_id, option])?;
                }
            }
        }

        tx.commit()?;
        info!(
            "Imported survey '{}' ({} questions) as id {}",
            survey.name,
            survey.questions.len(),
            survey_id
        );
        Ok(survey_id)
    }

    /// Row counts per table
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let count = |table: &str| -> SqliteResult<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            surveys: count("surveys")?,
            questions: count("questions")?,
            options: count("options")?,
        })
    }

    // =========================================================================
    // Row helpers
    // =========================================================================

    /// Option texts grouped by question, each group in option-ID order
    fn options_by_question(conn: &Connection) -> SqliteResult<HashMap<i64, Vec<String>>> {
        let mut stmt = conn.prepare(SELECT_OPTIONS)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            let (question_id, text) = row?;
            grouped.entry(question_id).or_default().push(text);
        }
        Ok(grouped)
    }

    fn query_questions(conn: &Connection) -> SqliteResult<Vec<QuestionRecord>> {
        let mut options = Self::options_by_question(conn)?;
        let mut stmt = conn.prepare(SELECT_QUESTIONS)?;

        let questions = stmt
            .query_map([], |row| {
                Ok(QuestionRecord {
                    id: row.get(0)?,
                    survey_id: row.get(1)?,
                    survey_name: row.get(2)?,
                    question_number: row.get(3)?,
                    text: row.get(4)?,
                    options: Vec::new(),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(questions
            .into_iter()
            .map(|mut question| {
                question.options = options.remove(&question.id).unwrap_or_default();
                question
            })
            .collect())
    }
}

impl SurveyRepository for SqliteStore {
    fn list_all_questions(&self) -> Result<Vec<QuestionRecord>> {
        let conn = self.conn.lock();
        Ok(Self::query_questions(&conn)?)
    }

    fn list_all_options(&self) -> Result<Vec<OptionRecord>> {
        let conn = self.conn.lock();

        let parents: HashMap<i64, QuestionRecord> = Self::query_questions(&conn)?
            .into_iter()
            .map(|question| (question.id, question))
            .collect();

        let mut stmt = conn.prepare(SELECT_OPTIONS)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut options = Vec::with_capacity(rows.len());
        for (id, question_id, text) in rows {
            // Orphans cannot exist with foreign keys on; skip rather than fail
            let Some(question) = parents.get(&question_id) else {
                debug!("Skipping option {} with missing question {}", id, question_id);
                continue;
            };
            options.push(OptionRecord {
                id,
                text,
                question: question.clone(),
            });
        }
        Ok(options)
    }

    fn list_surveys(&self) -> Result<Vec<SurveySummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT s.id, s.name, s.created_at, s.updated_at, COUNT(q.id)
            FROM surveys s
            LEFT JOIN questions q ON q.survey_id = s.id
            GROUP BY s.id
            ORDER BY s.id
            "#,
        )?;

        let surveys = stmt
            .query_map([], |row| {
                Ok(SurveySummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                    question_count: row.get::<_, i64>(4)? as usize,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(surveys)
    }

    fn get_survey(&self, id: i64) -> Result<Option<SurveyDetail>> {
        let conn = self.conn.lock();

        let header: Option<(String, DateTime<Utc>, Option<DateTime<Utc>>)> = conn
            .query_row(
                "SELECT name, created_at, updated_at FROM surveys WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((name, created_at, updated_at)) = header else {
            return Ok(None);
        };

        let mut options = Self::options_by_question(&conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, question_number, text FROM questions WHERE survey_id = ?1 ORDER BY id",
        )?;
        let questions = stmt
            .query_map([id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?
            .into_iter()
            .map(|(question_id, question_number, text)| QuestionSummary {
                question_number,
                text,
                options: options.remove(&question_id).unwrap_or_default(),
            })
            .collect();

        Ok(Some(SurveyDetail {
            id,
            name,
            created_at,
            updated_at,
            questions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn colors() -> NewSurvey {
        NewSurvey::new("Colors").question(
            "Q1",
            "What is your favorite color?",
            ["Red", "Blue", "Green"],
        )
    }

    #[test]
    fn test_create_in_memory() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(
            store.get_metadata("schema_version").unwrap(),
            Some(STORE_SCHEMA_VERSION.to_string())
        );
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_import_and_list_questions() {
        let store = SqliteStore::in_memory().unwrap();
        let survey_id = store.import(&colors()).unwrap();

        let questions = store.list_all_questions().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].survey_id, survey_id);
        assert_eq!(questions[0].survey_name, "Colors");
        assert_eq!(questions[0].question_number, "Q1");
        assert_eq!(questions[0].options, vec!["Red", "Blue", "Green"]);
    }

    #[test]
    fn test_list_options_resolves_parent() {
        let store = SqliteStore::in_memory().unwrap();
        store.import(&colors()).unwrap();

        let options = store.list_all_options().unwrap();
        let texts: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["Red", "Blue", "Green"]);

        for option in &options {
            assert_eq!(option.question.text, "What is your favorite color?");
            assert_eq!(option.question.survey_name, "Colors");
            assert_eq!(option.question.options.len(), 3);
        }
    }

    #[test]
    fn test_scan_order_follows_insertion() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .import(&NewSurvey::new("First").question("2", "Second label first", ["x"]))
            .unwrap();
        store
            .import(&NewSurvey::new("Second").question("1", "Later survey", ["y"]))
            .unwrap();

        let questions = store.list_all_questions().unwrap();
        assert_eq!(questions[0].survey_name, "First");
        assert_eq!(questions[1].survey_name, "Second");
    }

    #[test]
    fn test_question_without_options() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .import(&NewSurvey::new("Open").question("Q1", "Any comments?", Vec::<String>::new()))
            .unwrap();

        let questions = store.list_all_questions().unwrap();
        assert!(questions[0].options.is_empty());
        assert!(store.list_all_options().unwrap().is_empty());
    }

    #[test]
    fn test_list_surveys_counts_questions() {
        let store = SqliteStore::in_memory().unwrap();
        store.import(&colors()).unwrap();
        store.import(&NewSurvey::new("Empty")).unwrap();

        let surveys = store.list_surveys().unwrap();
        assert_eq!(surveys.len(), 2);
        assert_eq!(surveys[0].question_count, 1);
        assert_eq!(surveys[1].name, "Empty");
        assert_eq!(surveys[1].question_count, 0);
        assert!(surveys[1].updated_at.is_none());
    }

    #[test]
    fn test_get_survey() {
        let store = SqliteStore::in_memory().unwrap();
        let id = store.import(&colors()).unwrap();

        let detail = store.get_survey(id).unwrap().unwrap();
        assert_eq!(detail.name, "Colors");
        assert_eq!(detail.questions.len(), 1);
        assert_eq!(detail.questions[0].options, vec!["Red", "Blue", "Green"]);

        assert!(store.get_survey(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let store = SqliteStore::in_memory().unwrap();
        store.import(&colors()).unwrap();

        assert_eq!(
            store.stats().unwrap(),
            StoreStats {
                surveys: 1,
                questions: 1,
                options: 3,
            }
        );
    }
}
