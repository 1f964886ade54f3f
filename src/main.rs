//! SEC Filing Crawler — Binary Entrypoint
//!
//! `watch` runs the real-time crawler until interrupted; `fetch` pulls one
//! company's most recent filing and exits.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sec_filing_crawler::backfill;
use sec_filing_crawler::config::CrawlerConfig;
use sec_filing_crawler::crawler::Crawler;
use sec_filing_crawler::fetch::{PageFetcher, RateLimitedFetcher};
use sec_filing_crawler::ratelimit::RateLimiter;
use sec_filing_crawler::resolver::DocumentResolver;
use sec_filing_crawler::storage::ArtifactStore;
use sec_filing_crawler::telemetry;
use sec_filing_crawler::types::FilingType;

#[derive(Parser)]
#[command(name = "sec-filing-crawler", about = "Real-time SEC EDGAR filing crawler")]
struct Cli {
    /// Config file (default: config/crawler.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the EDGAR current-filings feeds and store every new filing
    Watch,
    /// Fetch one company's most recent filing and exit
    Fetch {
        /// Company CIK, with or without leading zeros
        #[arg(long)]
        cik: String,
        /// Form type to fetch
        #[arg(long, default_value = "10-K")]
        filing_type: FilingType,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().compact())
        .init();

    let cli = Cli::parse();
    let config = CrawlerConfig::load(cli.config.as_deref())?;
    telemetry::install_exporter()?;

    match cli.command {
        Commands::Watch => {
            let crawler = Crawler::start(config).await?;
            tokio::signal::ctrl_c()
                .await
                .context("waiting for shutdown signal")?;
            tracing::info!("shutdown signal received, draining");
            crawler.shutdown().await;
        }
        Commands::Fetch { cik, filing_type } => {
            let limiter = Arc::new(RateLimiter::edgar_default());
            let fetcher: Arc<dyn PageFetcher> = Arc::new(RateLimitedFetcher::new(
                limiter,
                config.user_agent(),
                config.request_timeout(),
            )?);
            let resolver =
                DocumentResolver::with_archive_root(fetcher.clone(), config.archive_root.clone());
            let store = ArtifactStore::open(&config.raw_dir, &config.processed_dir).await?;

            let paths = backfill::fetch_latest(
                &*fetcher,
                &resolver,
                &store,
                &config.data_api_root,
                &cik,
                filing_type,
            )
            .await?;
            println!("Raw:       {}", paths.raw.display());
            println!("Processed: {}", paths.processed.display());
        }
    }

    Ok(())
}
