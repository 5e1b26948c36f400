//! Database schema
//!
//! The foreign key on `qualified` is advisory only: extraction builds the
//! department and admission maps independently, so a qualified row may
//! reference a department id no department row carries.

/// SQL schema for the crawled store
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS universities (
    id      CHAR(3)     PRIMARY KEY    NOT NULL,
    name    CHAR(50)                   NOT NULL
);

CREATE TABLE IF NOT EXISTS departments (
    id     CHAR(6)      PRIMARY KEY    NOT NULL,
    name   CHAR(100)                   NOT NULL
);

CREATE TABLE IF NOT EXISTS qualified (
    department_id    CHAR(6)    NOT NULL,
    admission_id     CHAR(8)    NOT NULL,
    FOREIGN KEY(department_id) REFERENCES departments(id)
);

CREATE INDEX IF NOT EXISTS admission_id_index
ON qualified (admission_id);
"#;

/// Initializes the schema on a fresh or existing connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
