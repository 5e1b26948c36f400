//! Read-only lookup surface over a built store
//!
//! This is the contract the report tooling consumes: resolve candidate
//! numbers to the departments that admitted them, in either direction.

use crate::MirrorError;
use rusqlite::{params_from_iter, Connection};
use std::collections::BTreeMap;
use std::path::Path;

pub struct LookupDb {
    conn: Connection,
    university_map: BTreeMap<String, String>,
    department_map: BTreeMap<String, String>,
}

impl LookupDb {
    /// Opens an existing store; a missing file is an error, never an
    /// implicit create
    pub fn open(db_file: &Path) -> crate::Result<Self> {
        if !db_file.is_file() {
            return Err(MirrorError::DatabaseMissing(db_file.to_path_buf()));
        }

        let conn = Connection::open(db_file)?;
        let university_map = load_name_map(&conn, "universities")?;
        let department_map = load_name_map(&conn, "departments")?;

        Ok(Self {
            conn,
            university_map,
            department_map,
        })
    }

    pub fn university_name(&self, id: &str) -> Option<&str> {
        self.university_map.get(id).map(String::as_str)
    }

    pub fn department_name(&self, id: &str) -> Option<&str> {
        self.department_map.get(id).map(String::as_str)
    }

    /// For each admission id, the department ids that list it
    ///
    /// Every queried id gets an entry; ids absent from the store map to an
    /// empty list.
    pub fn lookup_by_admission_ids(
        &self,
        admission_ids: &[String],
    ) -> crate::Result<BTreeMap<String, Vec<String>>> {
        let mut results = BTreeMap::new();

        let mut stmt = self
            .conn
            .prepare("SELECT department_id FROM qualified WHERE admission_id = ?1")?;

        for admission_id in admission_ids {
            let department_ids = stmt
                .query_map([admission_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            results.insert(admission_id.clone(), department_ids);
        }

        Ok(results)
    }

    /// Same shape as [`lookup_by_admission_ids`](Self::lookup_by_admission_ids),
    /// derived by first resolving every admission id the given departments
    /// list
    pub fn lookup_by_department_ids(
        &self,
        department_ids: &[String],
    ) -> crate::Result<BTreeMap<String, Vec<String>>> {
        if department_ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let placeholders = vec!["?"; department_ids.len()].join(",");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT admission_id FROM qualified WHERE department_id IN ({placeholders})"
        ))?;

        let mut admission_ids = stmt
            .query_map(params_from_iter(department_ids), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        admission_ids.sort();
        admission_ids.dedup();

        self.lookup_by_admission_ids(&admission_ids)
    }
}

fn load_name_map(
    conn: &Connection,
    table: &str,
) -> Result<BTreeMap<String, String>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("SELECT id, name FROM {table}"))?;
    let map = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<BTreeMap<String, String>, _>>()?;
    Ok(map)
}
