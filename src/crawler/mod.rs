//! The crawl pipeline: fetcher, on-disk page cache, link extraction, and the
//! three-level discovery walk.

pub mod cache;
pub mod coordinator;
pub mod fetcher;
pub mod parser;

pub use cache::PageCache;
pub use coordinator::{CrawlSummary, Crawler};
pub use fetcher::{build_http_client, FailedUrls, FetchPolicy, Fetcher};
pub use parser::{links_with_prefix, parse_links, ParseError};
