//! # Crawler Wiring
//! Owns the queue, the shared rate limiter, the dedup window, and the
//! artifact store; spawns the poller, the workers, and a status reporter;
//! joins them all on shutdown.

use std::sync::Arc;
use std::time::Duration;

use metrics::gauge;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::CrawlerConfig;
use crate::dedup::DedupRegistry;
use crate::fetch::{PageFetcher, RateLimitedFetcher};
use crate::poller::FeedPoller;
use crate::pool::{spawn_workers, CrawlStats};
use crate::ratelimit::RateLimiter;
use crate::resolver::DocumentResolver;
use crate::shutdown::ShutdownToken;
use crate::storage::ArtifactStore;
use crate::telemetry::ensure_metrics_described;
use crate::types::Job;

const STATUS_INTERVAL: Duration = Duration::from_secs(60);

/// A running crawler. Holds the shutdown token and the handles of every
/// spawned task; [`shutdown`](Self::shutdown) drains and joins them.
pub struct Crawler {
    shutdown: ShutdownToken,
    handles: Vec<JoinHandle<()>>,
}

impl Crawler {
    /// Start against live EDGAR with a rate-limited HTTP fetcher.
    pub async fn start(config: CrawlerConfig) -> anyhow::Result<Self> {
        let limiter = Arc::new(RateLimiter::edgar_default());
        let fetcher: Arc<dyn PageFetcher> = Arc::new(RateLimitedFetcher::new(
            limiter,
            config.user_agent(),
            config.request_timeout(),
        )?);
        Self::start_with_fetcher(config, fetcher).await
    }

    /// Start with an explicit fetcher; tests inject a scripted one here.
    pub async fn start_with_fetcher(
        config: CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
    ) -> anyhow::Result<Self> {
        ensure_metrics_described();

        let dedup = Arc::new(DedupRegistry::with_capacity(config.dedup_capacity));
        let store = Arc::new(ArtifactStore::open(&config.raw_dir, &config.processed_dir).await?);
        let resolver = Arc::new(DocumentResolver::with_archive_root(
            fetcher.clone(),
            config.archive_root.clone(),
        ));
        let stats = Arc::new(CrawlStats::default());
        let shutdown = ShutdownToken::new();

        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>(config.queue_capacity);

        let mut handles = spawn_workers(config.workers, jobs_rx, resolver, store, stats.clone());

        let poller = FeedPoller::new(
            fetcher,
            dedup.clone(),
            config.feeds_or_default(),
            config.check_interval(),
            jobs_tx.clone(),
            shutdown.clone(),
        );
        handles.push(tokio::spawn(poller.run()));

        // The reporter holds only a weak sender so the queue still closes
        // once the poller drops the last strong one.
        handles.push(tokio::spawn(status_reporter(
            stats,
            dedup,
            jobs_tx.downgrade(),
            shutdown.clone(),
        )));
        drop(jobs_tx);

        tracing::info!(workers = config.workers, "crawler started");
        Ok(Self { shutdown, handles })
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Cancel the token, let queued jobs drain, and join every task.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = ?e, "task join failed during shutdown");
            }
        }
        tracing::info!("crawler stopped");
    }
}

/// Emits a status line every minute: runtime, filings stored, queue depth,
/// dedup window size. Also refreshes the corresponding gauges.
async fn status_reporter(
    stats: Arc<CrawlStats>,
    dedup: Arc<DedupRegistry>,
    jobs: mpsc::WeakSender<Job>,
    shutdown: ShutdownToken,
) {
    let started = tokio::time::Instant::now();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(STATUS_INTERVAL) => {}
        }

        let queue_depth = jobs
            .upgrade()
            .map(|tx| tx.max_capacity() - tx.capacity())
            .unwrap_or(0);
        let secs = started.elapsed().as_secs();
        let runtime = format!("{}h {}m", secs / 3600, (secs % 3600) / 60);

        gauge!("crawler_queue_depth").set(queue_depth as f64);
        gauge!("crawler_dedup_size").set(dedup.len() as f64);
        tracing::info!(
            runtime = %runtime,
            filings_processed = stats.processed(),
            queue_depth,
            dedup_size = dedup.len(),
            "status"
        );
    }
}
