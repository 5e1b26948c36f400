//! HTTP fetcher
//!
//! One GET against the portal with bounded retries and exponential backoff.
//! The portal sits behind an anti-bot challenge; a browser-like profile with
//! a cookie jar is enough to get through it, so the client is built that way
//! rather than with a crawler user agent.

use crate::config::Settings;
use reqwest::Client;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Browser profile presented to the portal
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0 Safari/537.36";

/// Retry schedule for a single URL
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Total attempts before the URL is recorded as failed
    pub attempts: u32,
    /// Backoff base; the delay doubles after every failed attempt
    pub base_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
    /// Per-attempt request timeout
    pub timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FetchPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            attempts: settings.fetch_attempts,
            base_delay: Duration::from_millis(settings.fetch_base_delay_ms),
            max_delay: Duration::from_millis(settings.fetch_max_delay_ms),
            timeout: settings.fetch_timeout(),
        }
    }

    /// Sleep before retrying after the given failed attempt (1-based):
    /// `min(base * 2^(attempt-1), max)`
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Concurrency-safe collector of URLs whose retries were exhausted
///
/// Shared by every pool worker for the duration of one run; flushed to the
/// sidecar log at the end if non-empty.
#[derive(Debug, Clone, Default)]
pub struct FailedUrls {
    inner: Arc<Mutex<Vec<String>>>,
}

impl FailedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: &str) {
        self.inner.lock().unwrap().push(url.to_string());
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().unwrap().clone()
    }

    /// Writes the collected URLs to `path`, one per line
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let urls = self.snapshot();
        let mut out = String::new();
        for url in &urls {
            out.push_str(url);
            out.push('\n');
        }
        std::fs::write(path, out)
    }
}

/// Builds the challenge-tolerant HTTP client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs retried GETs and records permanent failures
pub struct Fetcher {
    client: Client,
    policy: FetchPolicy,
    failed: FailedUrls,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy, failed: FailedUrls) -> crate::Result<Self> {
        let client = build_http_client(policy.timeout)?;
        Ok(Self {
            client,
            policy,
            failed,
        })
    }

    /// Fetches one URL
    ///
    /// Transport errors and non-2xx statuses drive the retry loop and are
    /// never propagated. After the final attempt the URL goes into the
    /// failed-URL collection and `None` comes back. A 2xx body with no
    /// case-insensitive `<html` marker is a placeholder response from the
    /// portal: logged and returned as empty content, neither retried nor
    /// marked failed.
    pub async fn get(&self, url: &str) -> Option<String> {
        for attempt in 1..=self.policy.attempts {
            match self.try_get(url).await {
                Ok(content) => {
                    if !content.to_lowercase().contains("<html") {
                        tracing::warn!("Invalid HTML content from {url}");
                        return Some(String::new());
                    }
                    return Some(content);
                }
                Err(e) => {
                    if attempt == self.policy.attempts {
                        tracing::error!("Failed to fetch {url} after {attempt} attempts: {e}");
                        self.failed.push(url);
                        return None;
                    }
                    let delay = self.policy.delay_after(attempt);
                    tracing::info!(
                        "Attempt {attempt} failed for {url}. Retrying in {}s: {e}",
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        None
    }

    async fn try_get(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}
