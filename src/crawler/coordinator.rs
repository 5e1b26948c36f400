//! Crawl coordinator
//!
//! Drives the three-level discovery walk: college list, per-college
//! department lists, per-department apply pages. Level 1 is strictly
//! sequential; levels 2 and 3 each run on a bounded worker pool that is fully
//! drained before the next level starts. Once the mirror is populated the
//! coordinator hands over to extraction and the store build.

use crate::config::{Settings, Stage, COLLEGE_LIST_FILENAME, FAILED_URLS_FILENAME};
use crate::crawler::cache::PageCache;
use crate::crawler::fetcher::{FailedUrls, FetchPolicy, Fetcher};
use crate::crawler::parser::links_with_prefix;
use crate::url::{index_url_to_base_url, simplify_url};
use crate::MirrorError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Hrefs on the college list pointing at per-college department lists
const LEVEL1_PREFIX: &str = "web/";

/// Hrefs on a department list pointing at apply pages; `extra/` carries the
/// supplementary-quota variants
const LEVEL2_PREFIXES: [&str; 2] = ["common/", "extra/"];

/// What one `run()` covered, for the caller's summary line
#[derive(Debug)]
pub struct CrawlSummary {
    /// Level-1 department-list pages discovered on the college list
    pub college_pages: usize,
    /// Level-2 apply pages discovered across all department lists
    pub apply_pages: usize,
    /// URLs whose retries were exhausted
    pub failed_urls: usize,
}

pub struct Crawler {
    settings: Settings,
    result_dir: PathBuf,
    db_file: PathBuf,
    cache: Arc<PageCache>,
    failed: FailedUrls,
}

impl Crawler {
    pub fn new(settings: Settings, year: i32, stage: Stage, seed_url: &str) -> crate::Result<Self> {
        let base_url = index_url_to_base_url(seed_url);
        let result_dir = settings.result_dir(year, stage);
        let db_file = settings.db_file(year, stage);

        let failed = FailedUrls::new();
        let fetcher = Fetcher::new(FetchPolicy::from_settings(&settings), failed.clone())?;
        let cache = Arc::new(PageCache::new(base_url, result_dir.clone(), fetcher));

        Ok(Self {
            settings,
            result_dir,
            db_file,
            cache,
            failed,
        })
    }

    /// Runs the crawl to completion: mirror, sidecar log, extraction, store
    ///
    /// Individual branch failures never abort siblings; whatever was cached
    /// is extracted and loaded, so a partial mirror still yields a usable
    /// store. Only an unusable seed page is fatal.
    pub async fn run(&self) -> crate::Result<CrawlSummary> {
        std::fs::create_dir_all(&self.result_dir)?;

        let college_pages = self.discover_college_list().await?;
        tracing::info!("Discovered {} department lists", college_pages.len());

        let apply_pages = self.fetch_department_lists(&college_pages).await?;
        tracing::info!("Discovered {} apply pages", apply_pages.len());

        self.fetch_department_applys(&apply_pages).await?;
        tracing::info!("Finish crawling.");

        let failed_urls = self.failed.len();
        if failed_urls > 0 {
            let log_path = self.result_dir.join(FAILED_URLS_FILENAME);
            self.failed.write_to(&log_path)?;
            tracing::warn!(
                "{failed_urls} URLs failed completely. Saved to: {}",
                log_path.display()
            );
        }

        let records = crate::extract::extract(&self.result_dir)?;
        crate::storage::build(&self.db_file, &records)?;

        Ok(CrawlSummary {
            college_pages: college_pages.len(),
            apply_pages: apply_pages.len(),
            failed_urls,
        })
    }

    /// Level 1: fetch the college list and collect `web/` hrefs
    ///
    /// A junk cached copy (e.g. from a run against a wrong seed URL) gets one
    /// forced refetch; a second parse failure is fatal because the entire
    /// walk hangs off this page.
    async fn discover_college_list(&self) -> crate::Result<Vec<String>> {
        let url = self.cache.absolute_url(COLLEGE_LIST_FILENAME);

        let content = self.cache.fetch_and_save(&url, false).await?;
        match links_with_prefix(&content, &[LEVEL1_PREFIX]) {
            Ok(links) => Ok(links),
            Err(_) => {
                tracing::warn!("Unparseable college list, refetching once: {url}");
                let content = self.cache.fetch_and_save(&url, true).await?;
                links_with_prefix(&content, &[LEVEL1_PREFIX]).map_err(|_| {
                    MirrorError::SeedPage {
                        url: url.clone(),
                        reason: "still unparseable after a forced refetch".to_string(),
                    }
                })
            }
        }
    }

    /// Level 2: fetch every department list, collect `common/` and `extra/`
    /// hrefs, and re-anchor them below `web/` for the next level
    async fn fetch_department_lists(&self, filepaths: &[String]) -> crate::Result<Vec<String>> {
        let semaphore = Arc::new(Semaphore::new(self.settings.worker_count));
        let mut workers: JoinSet<Vec<String>> = JoinSet::new();

        for filepath in filepaths {
            let cache = Arc::clone(&self.cache);
            let semaphore = Arc::clone(&semaphore);
            let url = cache.absolute_url(filepath);

            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Vec::new();
                };

                let content = match cache.fetch_and_save(&url, false).await {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!("Skipping department list {url}: {e}");
                        return Vec::new();
                    }
                };

                match links_with_prefix(&content, &LEVEL2_PREFIXES) {
                    Ok(links) => links
                        .into_iter()
                        .map(|href| simplify_url(&format!("web/{href}")))
                        .collect(),
                    // a dead branch, already logged by the fetcher
                    Err(_) => Vec::new(),
                }
            });
        }

        let mut apply_pages = Vec::new();
        while let Some(result) = workers.join_next().await {
            apply_pages.extend(result?);
        }
        Ok(apply_pages)
    }

    /// Level 3: fetch every apply page into the mirror; no further discovery
    async fn fetch_department_applys(&self, filepaths: &[String]) -> crate::Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.settings.worker_count));
        let mut workers: JoinSet<()> = JoinSet::new();

        for filepath in filepaths {
            let cache = Arc::clone(&self.cache);
            let semaphore = Arc::clone(&semaphore);
            let url = cache.absolute_url(filepath);

            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if let Err(e) = cache.fetch_and_save(&url, false).await {
                    tracing::warn!("Skipping apply page {url}: {e}");
                }
            });
        }

        while let Some(result) = workers.join_next().await {
            result?;
        }
        Ok(())
    }
}
