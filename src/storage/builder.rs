//! Store builder
//!
//! Every run rebuilds the store from scratch; there is no incremental
//! upsert. The build targets a sibling temp file and renames it over the
//! real database only on success, so a mid-build failure (notably a
//! duplicate department primary key) leaves any previous store intact.

use crate::extract::ExtractedRecords;
use crate::storage::schema::initialize_schema;
use rusqlite::{params, Connection};
use std::path::Path;

/// Builds the relational store at `db_path` from the extracted maps
pub fn build(db_path: &Path, records: &ExtractedRecords) -> crate::Result<()> {
    tracing::info!("Store build: filling data into {}", db_path.display());

    let tmp_path = db_path.with_extension("db.tmp");
    let _ = std::fs::remove_file(&tmp_path);

    let mut conn = Connection::open(&tmp_path)?;
    let result = populate(&mut conn, records);
    let close_result = conn.close().map_err(|(_, e)| e);

    if let Err(e) = result.and(close_result.map_err(crate::MirrorError::from)) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, db_path)?;
    tracing::info!("Store build: done.");
    Ok(())
}

fn populate(conn: &mut Connection, records: &ExtractedRecords) -> crate::Result<()> {
    initialize_schema(conn)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO universities (id, name) VALUES (?1, ?2)")?;
        for (id, name) in &records.institutions {
            stmt.execute(params![id, name])?;
        }

        let mut stmt = tx.prepare("INSERT INTO departments (id, name) VALUES (?1, ?2)")?;
        for (id, name) in &records.departments {
            stmt.execute(params![id, name])?;
        }

        let mut stmt =
            tx.prepare("INSERT INTO qualified (department_id, admission_id) VALUES (?1, ?2)")?;
        for (department_id, admission_ids) in &records.qualified {
            for admission_id in admission_ids {
                stmt.execute(params![department_id, admission_id])?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_records() -> ExtractedRecords {
        let mut records = ExtractedRecords::default();
        records
            .institutions
            .insert("013".to_string(), "國立交通大學".to_string());
        records
            .departments
            .insert("013032L".to_string(), "電子工程學系(甲組)".to_string());
        records.qualified.insert(
            "013032L".to_string(),
            vec![
                "10008031".to_string(),
                "10008032".to_string(),
                "10008031".to_string(),
            ],
        );
        records
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn builds_a_queryable_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sqlite3.db");

        build(&db_path, &sample_records()).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(count(&conn, "universities"), 1);
        assert_eq!(count(&conn, "departments"), 1);
        // duplicate admission ids are separate rows
        assert_eq!(count(&conn, "qualified"), 3);
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sqlite3.db");

        build(&db_path, &sample_records()).unwrap();

        let mut second = ExtractedRecords::default();
        second
            .institutions
            .insert("001".to_string(), "國立臺灣大學".to_string());
        build(&db_path, &second).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(count(&conn, "universities"), 1);
        assert_eq!(count(&conn, "departments"), 0);
        assert_eq!(count(&conn, "qualified"), 0);
        let name: String = conn
            .query_row("SELECT name FROM universities WHERE id='001'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(name, "國立臺灣大學");
    }

    #[test]
    fn empty_records_still_produce_a_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sqlite3.db");

        build(&db_path, &ExtractedRecords::default()).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(count(&conn, "universities"), 0);
    }

    #[test]
    fn no_temp_file_survives_a_successful_build() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sqlite3.db");

        build(&db_path, &sample_records()).unwrap();
        assert!(db_path.exists());
        assert!(!db_path.with_extension("db.tmp").exists());
    }

    #[test]
    fn qualified_rows_may_reference_unknown_departments() {
        // extraction phases are independent; the FK is declared, not enforced
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("sqlite3.db");

        let mut records = ExtractedRecords::default();
        records
            .qualified
            .insert("999999".to_string(), vec!["10000001".to_string()]);

        build(&db_path, &records).unwrap();
        let conn = Connection::open(&db_path).unwrap();
        assert_eq!(count(&conn, "qualified"), 1);
        assert_eq!(count(&conn, "departments"), 0);
    }
}
