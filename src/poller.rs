//! # Feed Poller
//! Producer side of the crawler: polls every configured feed each cycle,
//! filters announcements through the dedup window, and enqueues jobs.
//!
//! Failure containment is layered: one failing feed never stops the
//! others, and an unexpected cycle-level failure logs, backs off for a
//! second, and keeps going. The loop only exits on the shutdown token.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::config::FeedSpec;
use crate::dedup::DedupRegistry;
use crate::error::CrawlError;
use crate::feed;
use crate::fetch::PageFetcher;
use crate::shutdown::ShutdownToken;
use crate::types::Job;

const CYCLE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

pub struct FeedPoller {
    fetcher: Arc<dyn PageFetcher>,
    dedup: Arc<DedupRegistry>,
    feeds: Vec<FeedSpec>,
    interval: Duration,
    jobs: mpsc::Sender<Job>,
    shutdown: ShutdownToken,
}

impl FeedPoller {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        dedup: Arc<DedupRegistry>,
        feeds: Vec<FeedSpec>,
        interval: Duration,
        jobs: mpsc::Sender<Job>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            fetcher,
            dedup,
            feeds,
            interval,
            jobs,
            shutdown,
        }
    }

    /// Poll until the shutdown token fires. Consumes the poller; dropping
    /// its queue sender on exit is what lets the workers drain and stop.
    pub async fn run(self) {
        tracing::info!(
            feeds = self.feeds.len(),
            interval_ms = self.interval.as_millis() as u64,
            "feed poller started"
        );

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if let Err(e) = self.cycle().await {
                tracing::warn!(error = ?e, "poll cycle failed");
                counter!("crawler_cycle_errors_total").increment(1);
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = sleep(CYCLE_ERROR_BACKOFF) => {}
                }
                continue;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        tracing::info!("feed poller stopped");
    }

    /// One pass over all feeds, sequentially. Per-feed failures are logged
    /// and contained here; anything escaping this function hits the
    /// backoff path in `run`.
    async fn cycle(&self) -> anyhow::Result<()> {
        for spec in &self.feeds {
            if self.shutdown.is_cancelled() {
                break;
            }
            if let Err(e) = self.check_feed(spec).await {
                tracing::warn!(
                    feed = %spec.url,
                    filing_type = %spec.filing_type,
                    kind = e.kind(),
                    error = %e,
                    "feed check failed"
                );
                counter!("crawler_feed_errors_total").increment(1);
            }
        }
        Ok(())
    }

    async fn check_feed(&self, spec: &FeedSpec) -> Result<(), CrawlError> {
        let page = self.fetcher.get(&spec.url).await?;
        if !page.is_ok() {
            return Err(CrawlError::Network {
                url: spec.url.clone(),
                source: format!("HTTP {}", page.status).into(),
            });
        }

        let announcements = feed::parse_feed(&page.body_text())?;
        for announcement in announcements {
            if !self.dedup.is_new(&announcement.id) {
                continue;
            }
            counter!("crawler_announcements_total").increment(1);

            let job = Job {
                announcement,
                filing_type: spec.filing_type,
            };
            // Bounded send: a full queue backpressures the poller. A closed
            // queue means every worker is gone, which only happens during
            // shutdown.
            if self.jobs.send(job).await.is_err() {
                tracing::info!("job queue closed, stopping feed check");
                return Ok(());
            }
        }
        Ok(())
    }
}
