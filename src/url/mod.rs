//! URL conventions of the admissions portal
//!
//! The portal publishes everything below one deeply nested base directory
//! (e.g. `https://www.cac.edu.tw/CacLink/apply113/.../ColPost/`). Discovered
//! hrefs are relative paths under that base, which is also how the on-disk
//! mirror is laid out.

use crate::MirrorError;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static FINAL_FILE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-zA-Z0-9_]+$").unwrap());

static DOT_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|/)\./").unwrap());

// No lookbehind in the regex crate; capture the preceding char instead so a
// scheme's `://` survives.
static SLASH_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|[^:])/{2,}").unwrap());

/// Derives the crawl's base URL from a user-supplied seed index URL
///
/// If the seed ends in a file segment (`.../ColPost/index.html`), that
/// segment is dropped. The result always carries exactly one trailing slash.
pub fn index_url_to_base_url(index_url: &str) -> String {
    let mut base = index_url.trim().to_string();

    if FINAL_FILE_SEGMENT.is_match(&base) {
        base = match base.rfind('/') {
            Some(pos) => base[..pos].to_string(),
            None => String::new(),
        };
    }

    format!("{}/", base.trim_end_matches('/'))
}

/// Normalizes a relative href discovered at one level for use at the next
///
/// Collapses `./` segments and runs of two or more slashes into one, leaving
/// a scheme's `://` alone.
pub fn simplify_url(url: &str) -> String {
    let url = DOT_SEGMENT.replace_all(url, "$1");
    SLASH_RUN.replace_all(&url, "${1}/").into_owned()
}

/// Maps a page URL onto its path relative to the mirror root
///
/// The URL's path below the base maps 1:1 onto directory segments. The
/// portal never produces hostile paths, but a URL-derived string is still a
/// URL-derived string: empty, `.`, `..`, and backslash segments are refused
/// rather than handed to the filesystem.
pub fn cache_relative_path(base_url: &str, url: &str) -> crate::Result<PathBuf> {
    let rel = url
        .strip_prefix(base_url)
        .ok_or_else(|| MirrorError::ForeignUrl {
            url: url.to_string(),
            base: base_url.to_string(),
        })?;

    if rel.is_empty() {
        return Err(MirrorError::UnsafePath {
            url: url.to_string(),
            segment: String::new(),
        });
    }

    let mut path = PathBuf::new();
    for segment in rel.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return Err(MirrorError::UnsafePath {
                url: url.to_string(),
                segment: segment.to_string(),
            });
        }
        path.push(segment);
    }

    Ok(path)
}
