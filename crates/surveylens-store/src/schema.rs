//! SQLite schema for the survey database

/// Schema version stored in `store_metadata`
pub const STORE_SCHEMA_VERSION: &str = "1.0";

/// SQL to create the surveys table
pub const SCHEMA_CREATE_SURVEYS: &str = r#"
CREATE TABLE IF NOT EXISTS surveys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT
)
"#;

/// SQL to create the questions table
///
/// `question_number` is a display label, not an ordering key.
pub const SCHEMA_CREATE_QUESTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    survey_id INTEGER NOT NULL REFERENCES surveys(id) ON DELETE CASCADE,
    question_number TEXT NOT NULL,
    text TEXT NOT NULL
)
"#;

/// SQL to create the options table
pub const SCHEMA_CREATE_OPTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS options (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
    text TEXT NOT NULL
)
"#;

/// SQL to create indexes for parent lookups
pub const SCHEMA_CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_questions_survey ON questions(survey_id);
CREATE INDEX IF NOT EXISTS idx_options_question ON options(question_id);
"#;

/// SQL to create the metadata table
pub const SCHEMA_CREATE_METADATA: &str = r#"
CREATE TABLE IF NOT EXISTS store_metadata (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
"#;

/// Question scan joined with the owning survey, in storage order
pub const SELECT_QUESTIONS: &str = r#"
SELECT q.id, q.survey_id, s.name, q.question_number, q.text
FROM questions q
JOIN surveys s ON s.id = q.survey_id
ORDER BY q.id
"#;

/// Option scan in storage order
pub const SELECT_OPTIONS: &str = "SELECT id, question_id, text FROM options ORDER BY id";

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn create_all(conn: &Connection) {
        conn.execute(SCHEMA_CREATE_SURVEYS, []).unwrap();
        conn.execute(SCHEMA_CREATE_QUESTIONS, []).unwrap();
        conn.execute(SCHEMA_CREATE_OPTIONS, []).unwrap();
        conn.execute(SCHEMA_CREATE_METADATA, []).unwrap();
        conn.execute_batch(SCHEMA_CREATE_INDEXES).unwrap();
    }

    #[test]
    fn test_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_all(&conn);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"surveys".to_string()));
        assert!(tables.contains(&"questions".to_string()));
        assert!(tables.contains(&"options".to_string()));
        assert!(tables.contains(&"store_metadata".to_string()));
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_all(&conn);
        create_all(&conn);
    }

    #[test]
    fn test_cascade_delete_removes_children() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        create_all(&conn);

        conn.execute(
            "INSERT INTO surveys (name, created_at) VALUES ('s', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO questions (survey_id, question_number, text) VALUES (1, 'Q1', 't')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO options (question_id, text) VALUES (1, 'o')", [])
            .unwrap();

        conn.execute("DELETE FROM surveys WHERE id = 1", []).unwrap();

        let options: i64 = conn
            .query_row("SELECT COUNT(*) FROM options", [], |row| row.get(0))
            .unwrap();
        assert_eq!(options, 0);
    }
}
