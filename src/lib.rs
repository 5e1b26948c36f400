//! caac-mirror: a local mirror of the CAAC admission-result pages
//!
//! This crate discovers and fetches the three-level tree of admission-result
//! pages published by the CAAC portal, mirrors them on disk, and extracts the
//! institution/department/admittee records into a SQLite store that the
//! lookup tooling queries.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for caac-mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Seed page {url} is unusable: {reason}")]
    SeedPage { url: String, reason: String },

    #[error("URL {url} does not start with base URL {base}")]
    ForeignUrl { url: String, base: String },

    #[error("URL {url} maps to an unsafe cache path segment {segment:?}")]
    UnsafePath { url: String, segment: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database file does not exist: {0}")]
    DatabaseMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl worker panicked: {0}")]
    WorkerPanic(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for caac-mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Settings, Stage};
pub use crawler::{CrawlSummary, Crawler};
pub use extract::ExtractedRecords;
pub use storage::LookupDb;
