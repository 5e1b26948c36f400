//! On-disk page cache
//!
//! Maps a canonical URL onto a file below the result directory and serves
//! "fetch-if-absent" / "force-refetch" requests. A cached file is assumed
//! valid for the rest of the run and across runs; only an explicit
//! `overwrite` goes back to the network.

use crate::crawler::fetcher::Fetcher;
use crate::url::cache_relative_path;
use std::path::{Path, PathBuf};

pub struct PageCache {
    base_url: String,
    root: PathBuf,
    fetcher: Fetcher,
}

impl PageCache {
    pub fn new(base_url: String, root: PathBuf, fetcher: Fetcher) -> Self {
        Self {
            base_url,
            root,
            fetcher,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Composes the absolute URL for a base-relative page path
    pub fn absolute_url(&self, relative: &str) -> String {
        format!("{}{relative}", self.base_url)
    }

    /// Returns the page content for `url`, from disk when possible
    ///
    /// A cache hit performs no network access. A miss (or `overwrite=true`)
    /// fetches the page, persists it under the mirror root, and returns it.
    /// A fetch whose retries were exhausted persists as an empty file; the
    /// failure itself is already booked by the fetcher.
    pub async fn fetch_and_save(&self, url: &str, overwrite: bool) -> crate::Result<String> {
        tracing::info!("Fetching URL: {url}");

        let filepath = self.root.join(cache_relative_path(&self.base_url, url)?);

        if !overwrite && filepath.is_file() {
            tracing::info!("Found and reuse local file: {}", filepath.display());
            return Ok(tokio::fs::read_to_string(&filepath).await?);
        }

        let content = self.fetcher.get(url).await.unwrap_or_default();

        if let Some(parent) = filepath.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&filepath, &content).await?;

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::{FailedUrls, FetchPolicy};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> Fetcher {
        let policy = FetchPolicy {
            attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            timeout: Duration::from_secs(5),
        };
        Fetcher::new(policy, FailedUrls::new()).unwrap()
    }

    #[tokio::test]
    async fn cache_hit_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("web")).unwrap();
        std::fs::write(dir.path().join("web/cached.htm"), "<html>old</html>").unwrap();

        // base URL points at a closed port; any network access would fail
        let cache = PageCache::new(
            "http://127.0.0.1:9/".to_string(),
            dir.path().to_path_buf(),
            test_fetcher(),
        );

        let content = cache
            .fetch_and_save("http://127.0.0.1:9/web/cached.htm", false)
            .await
            .unwrap();
        assert_eq!(content, "<html>old</html>");
    }

    #[tokio::test]
    async fn miss_fetches_and_persists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/web/a.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>fresh</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base = format!("{}/", server.uri());
        let cache = PageCache::new(base.clone(), dir.path().to_path_buf(), test_fetcher());

        let url = format!("{base}web/a.htm");
        let content = cache.fetch_and_save(&url, false).await.unwrap();
        assert_eq!(content, "<html>fresh</html>");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("web/a.htm")).unwrap(),
            "<html>fresh</html>"
        );

        // second call is served from disk; expect(1) above would trip otherwise
        let again = cache.fetch_and_save(&url, false).await.unwrap();
        assert_eq!(again, "<html>fresh</html>");
    }

    #[tokio::test]
    async fn overwrite_refetches_over_a_cached_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page.htm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>new</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.htm"), "stale").unwrap();

        let base = format!("{}/", server.uri());
        let cache = PageCache::new(base.clone(), dir.path().to_path_buf(), test_fetcher());

        let content = cache
            .fetch_and_save(&format!("{base}page.htm"), true)
            .await
            .unwrap();
        assert_eq!(content, "<html>new</html>");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("page.htm")).unwrap(),
            "<html>new</html>"
        );
    }

    #[tokio::test]
    async fn exhausted_fetch_persists_an_empty_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.htm"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let base = format!("{}/", server.uri());
        let cache = PageCache::new(base.clone(), dir.path().to_path_buf(), test_fetcher());

        let content = cache
            .fetch_and_save(&format!("{base}gone.htm"), false)
            .await
            .unwrap();
        assert_eq!(content, "");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("gone.htm")).unwrap(),
            ""
        );
    }
}
