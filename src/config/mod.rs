//! Configuration loading and project layout
//!
//! Settings come from an optional TOML file; everything has a default so the
//! crawler runs with no config at all. The layout helpers map a (year, stage)
//! pair onto its result directory and database file.

pub mod parser;
pub mod types;
pub mod year;

pub use parser::load_settings;
pub use types::{
    Settings, Stage, COLLEGE_LIST_FILENAME, CRAWLED_DB_FILENAME, FAILED_URLS_FILENAME,
};
