use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::year;

/// Name of the relational store inside a result directory
pub const CRAWLED_DB_FILENAME: &str = "sqlite3.db";

/// Sidecar log of URLs whose retries were exhausted
pub const FAILED_URLS_FILENAME: &str = "failed_urls.txt";

/// The top-level index page anchoring the whole crawl
pub const COLLEGE_LIST_FILENAME: &str = "collegeList.htm";

/// Crawler settings, deserialized from TOML
///
/// Every field has a default, so a missing config file means "run with the
/// stock settings".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root directory under which per-year/per-stage mirrors are kept
    #[serde(rename = "data-root")]
    pub data_root: PathBuf,

    /// Fixed size of the worker pool for the level-2/level-3 fetches
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Total fetch attempts per URL before it is recorded as failed
    #[serde(rename = "fetch-attempts")]
    pub fetch_attempts: u32,

    /// Base delay of the exponential backoff, in milliseconds
    #[serde(rename = "fetch-base-delay-ms")]
    pub fetch_base_delay_ms: u64,

    /// Backoff cap, in milliseconds
    #[serde(rename = "fetch-max-delay-ms")]
    pub fetch_max_delay_ms: u64,

    /// Per-attempt request timeout, in milliseconds
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./data"),
            worker_count: 8,
            fetch_attempts: 5,
            fetch_base_delay_ms: 3_000,
            fetch_max_delay_ms: 30_000,
            fetch_timeout_ms: 10_000,
        }
    }
}

impl Settings {
    /// Result directory for a (year, stage) pair:
    /// `<data-root>/crawler_<taiwan_year>/stage_<stage>/`
    pub fn result_dir(&self, year: i32, stage: Stage) -> PathBuf {
        self.data_root
            .join(format!("crawler_{}", year::taiwanize(year)))
            .join(format!("stage_{}", stage))
    }

    /// Database file for a (year, stage) pair
    pub fn db_file(&self, year: i32, stage: Stage) -> PathBuf {
        self.result_dir(year, stage).join(CRAWLED_DB_FILENAME)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// The two admission phases the portal publishes separately
///
/// Each stage owns its own mirrored page tree and store; nothing is shared
/// across stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    /// First phase: sieve results
    Sieve,
    /// Second phase: entrance/dispatch results
    Entrance,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Sieve => write!(f, "sieve"),
            Stage::Entrance => write!(f, "entrance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_usable() {
        let settings = Settings::default();
        assert_eq!(settings.worker_count, 8);
        assert_eq!(settings.fetch_attempts, 5);
        assert_eq!(settings.fetch_base_delay_ms, 3_000);
        assert_eq!(settings.fetch_max_delay_ms, 30_000);
    }

    #[test]
    fn result_dir_uses_taiwan_year() {
        let settings = Settings {
            data_root: PathBuf::from("/data"),
            ..Settings::default()
        };
        assert_eq!(
            settings.result_dir(2024, Stage::Sieve),
            PathBuf::from("/data/crawler_113/stage_sieve")
        );
        // an already-Taiwanized year passes through
        assert_eq!(
            settings.result_dir(113, Stage::Entrance),
            PathBuf::from("/data/crawler_113/stage_entrance")
        );
    }

    #[test]
    fn db_file_sits_at_result_dir_root() {
        let settings = Settings::default();
        let db = settings.db_file(113, Stage::Sieve);
        assert!(db.ends_with("crawler_113/stage_sieve/sqlite3.db"));
    }

    #[test]
    fn stage_display_matches_directory_names() {
        assert_eq!(Stage::Sieve.to_string(), "sieve");
        assert_eq!(Stage::Entrance.to_string(), "entrance");
    }
}
