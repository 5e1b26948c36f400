//! Extraction pass over the mirrored page tree
//!
//! The portal's pages are loosely structured, so extraction is regex-driven:
//! institutions come from the top-level college list, departments and
//! admission numbers from every HTML file below the result directory. The
//! pass is read-only over the mirror and rebuilt from scratch each run.

use crate::config::COLLEGE_LIST_FILENAME;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `(013)國立交通大學`, occasionally with stray digits between code and name
static UNIVERSITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]{3})\)\d*([\w\s]+)").unwrap());

/// `(013032)電子工程學系(甲組)`, names may carry half- and full-width
/// brackets/parentheses
static DEPARTMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]{6})\)\s*([\w\s\[\]［］()（）]+)").unwrap());

/// A standalone 8-digit admission (exam ticket) number
static ADMISSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([0-9]{8})\b").unwrap());

/// The three maps the store is built from
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtractedRecords {
    /// 3-digit institution code -> institution name
    pub institutions: BTreeMap<String, String>,
    /// department id (filename stem, quota letter included) -> name
    pub departments: BTreeMap<String, String>,
    /// department id -> admission ids, duplicates preserved
    pub qualified: BTreeMap<String, Vec<String>>,
}

/// Walks the mirror under `result_dir` and extracts the three maps
///
/// The department id is the filename stem taken verbatim. A file like
/// `013062L.htm` declares `(013062)` in its body, but the trailing quota
/// letter only exists in the filename, so the stem wins; when several files
/// share a stem the last one parsed wins.
pub fn extract(result_dir: &Path) -> crate::Result<ExtractedRecords> {
    tracing::info!("Extraction: gathering data from the mirror...");

    let mut records = ExtractedRecords::default();

    let college_list = std::fs::read(result_dir.join(COLLEGE_LIST_FILENAME))?;
    for caps in UNIVERSITY.captures_iter(&String::from_utf8_lossy(&college_list)) {
        records
            .institutions
            .insert(caps[1].to_string(), caps[2].trim().to_string());
    }

    let mut files = Vec::new();
    collect_html_files(result_dir, &mut files)?;
    files.sort();

    for path in files {
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let content = String::from_utf8_lossy(&std::fs::read(&path)?).into_owned();

        for caps in DEPARTMENT.captures_iter(&content) {
            records
                .departments
                .insert(stem.to_string(), caps[2].trim().to_string());
        }

        for caps in ADMISSION.captures_iter(&content) {
            records
                .qualified
                .entry(stem.to_string())
                .or_default()
                .push(caps[1].to_string());
        }
    }

    tracing::info!(
        "Extraction: {} institutions, {} departments",
        records.institutions.len(),
        records.departments.len()
    );

    Ok(records)
}

/// Recursively collects every `.htm`/`.html` file under `dir`
fn collect_html_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_html_files(&path, out)?;
        } else if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("htm") | Some("html")
        ) {
            out.push(path);
        }
    }
    Ok(())
}
