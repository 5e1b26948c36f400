//! Anchor extraction from index pages
//!
//! The walk never needs more from a page than its `<a href>` targets; which
//! targets matter at a given level is decided by a path-prefix filter.

use scraper::{Html, Selector};
use thiserror::Error;

/// The cached content could not be parsed as HTML
///
/// In practice this means an empty or placeholder file, e.g. left behind by a
/// run that was pointed at a wrong seed URL. The caller is expected to force
/// one refetch before treating the branch as dead.
#[derive(Debug, Error)]
#[error("no parseable HTML content")]
pub struct ParseError;

/// Returns every anchor target in the document
pub fn parse_links(html: &str) -> Result<Vec<String>, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError);
    }

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").map_err(|_| ParseError)?;

    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect())
}

/// Returns anchor targets starting with one of the given path prefixes
pub fn links_with_prefix(html: &str, prefixes: &[&str]) -> Result<Vec<String>, ParseError> {
    let links = parse_links(html)?;
    Ok(links
        .into_iter()
        .filter(|href| prefixes.iter().any(|prefix| href.starts_with(prefix)))
        .collect())
}
