//! caac-mirror command-line interface

use anyhow::Context;
use caac_mirror::config::{load_settings, parser::validate, year, Settings, Stage};
use caac_mirror::{Crawler, LookupDb};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mirror the CAAC admission-result pages and index them into SQLite
#[derive(Parser, Debug)]
#[command(name = "caac-mirror")]
#[command(version = "1.0.0")]
#[command(about = "Mirror and index CAAC admission-result pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML settings file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover, fetch, and index one (year, stage) result tree
    Crawl {
        /// Seed index URL, e.g. https://.../ColPost/index.html
        #[arg(value_name = "URL")]
        seed_url: String,

        /// Target year, Gregorian or Taiwan numbering (default: current)
        #[arg(long)]
        year: Option<i32>,

        /// Admission stage
        #[arg(long, value_enum, default_value_t = Stage::Sieve)]
        stage: Stage,

        /// Override the configured data root
        #[arg(long, value_name = "DIR")]
        data_root: Option<PathBuf>,

        /// Override the configured worker pool size
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Query a previously built store
    Lookup {
        /// Target year, Gregorian or Taiwan numbering (default: current)
        #[arg(long)]
        year: Option<i32>,

        /// Admission stage
        #[arg(long, value_enum, default_value_t = Stage::Sieve)]
        stage: Stage,

        /// Admission ids to look up (comma separated)
        #[arg(long, value_delimiter = ',')]
        admission_ids: Vec<String>,

        /// Department ids to look up (comma separated)
        #[arg(long, value_delimiter = ',')]
        department_ids: Vec<String>,

        /// Override the configured data root
        #[arg(long, value_name = "DIR")]
        data_root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let settings = match &cli.config {
        Some(path) => load_settings(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Crawl {
            seed_url,
            year,
            stage,
            data_root,
            workers,
        } => handle_crawl(settings, seed_url, year, stage, data_root, workers).await,
        Command::Lookup {
            year,
            stage,
            admission_ids,
            department_ids,
            data_root,
        } => handle_lookup(settings, year, stage, admission_ids, department_ids, data_root),
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("caac_mirror=info,warn"),
            1 => EnvFilter::new("caac_mirror=debug,info"),
            2 => EnvFilter::new("caac_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn handle_crawl(
    mut settings: Settings,
    seed_url: String,
    year: Option<i32>,
    stage: Stage,
    data_root: Option<PathBuf>,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(root) = data_root {
        settings.data_root = root;
    }
    if let Some(count) = workers {
        settings.worker_count = count;
    }
    validate(&settings)?;

    let seed = url::Url::parse(seed_url.trim()).context("invalid seed URL")?;
    if seed.scheme() != "http" && seed.scheme() != "https" {
        anyhow::bail!("seed URL must be http(s), got {}", seed.scheme());
    }

    let year = year.unwrap_or_else(year::current_taiwan_year);
    tracing::info!(
        "Crawling year {} stage {stage} from {seed_url}",
        year::taiwanize(year)
    );

    let result_dir = settings.result_dir(year, stage);
    let crawler = Crawler::new(settings, year, stage, &seed_url)?;
    let summary = crawler.run().await?;

    tracing::info!(
        "Crawl complete: {} department lists, {} apply pages, {} failed URLs",
        summary.college_pages,
        summary.apply_pages,
        summary.failed_urls
    );
    tracing::info!("Crawled files are stored in: {}", result_dir.display());

    Ok(())
}

fn handle_lookup(
    mut settings: Settings,
    year: Option<i32>,
    stage: Stage,
    admission_ids: Vec<String>,
    department_ids: Vec<String>,
    data_root: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(root) = data_root {
        settings.data_root = root;
    }

    let admission_ids = unique_nonempty(admission_ids);
    let department_ids = unique_nonempty(department_ids);
    if admission_ids.is_empty() && department_ids.is_empty() {
        anyhow::bail!("nothing to look up: pass --admission-ids and/or --department-ids");
    }

    let year = year.unwrap_or_else(year::current_taiwan_year);
    let db_file = settings.db_file(year, stage);
    let db = LookupDb::open(&db_file)?;

    let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if !admission_ids.is_empty() {
        results.extend(db.lookup_by_admission_ids(&admission_ids)?);
    }
    if !department_ids.is_empty() {
        results.extend(db.lookup_by_department_ids(&department_ids)?);
    }

    for (admission_id, department_ids) in &results {
        println!("{admission_id}:");
        for department_id in department_ids {
            let university = db
                .university_name(&department_id[..department_id.len().min(3)])
                .unwrap_or("?");
            let department = db.department_name(department_id).unwrap_or("?");
            println!("  {department_id}  {university} {department}");
        }
    }

    Ok(())
}

/// Dedupes ids, drops empties, keeps a stable order
fn unique_nonempty(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
