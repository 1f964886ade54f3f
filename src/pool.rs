//! # Worker Pool
//! Consumer side of the crawler: a fixed set of workers draining the job
//! queue, each running resolve → normalize → store for one filing at a
//! time.
//!
//! Every error is contained at the job boundary: the job is logged with
//! its identifying fields and dropped, with no retry. Workers exit when
//! the queue closes and its backlog is drained, which keeps shutdown
//! deterministic without sentinel values.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::CrawlError;
use crate::feed;
use crate::normalize::normalize;
use crate::resolver::DocumentResolver;
use crate::storage::{ArtifactStore, StoredPaths};
use crate::types::{ArtifactKey, Job};

/// Counters shared between the workers and the status reporter.
#[derive(Debug, Default)]
pub struct CrawlStats {
    processed: AtomicU64,
}

impl CrawlStats {
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

/// Spawn `count` workers sharing one queue receiver. The handles complete
/// once every queue sender is dropped and the backlog is drained.
pub fn spawn_workers(
    count: usize,
    jobs: mpsc::Receiver<Job>,
    resolver: Arc<DocumentResolver>,
    store: Arc<ArtifactStore>,
    stats: Arc<CrawlStats>,
) -> Vec<JoinHandle<()>> {
    let jobs = Arc::new(Mutex::new(jobs));
    (0..count)
        .map(|worker| {
            let jobs = jobs.clone();
            let resolver = resolver.clone();
            let store = store.clone();
            let stats = stats.clone();
            tokio::spawn(async move {
                loop {
                    let job = { jobs.lock().await.recv().await };
                    let Some(job) = job else { break };

                    match process(&job, &resolver, &store).await {
                        Ok(paths) => {
                            stats.record_processed();
                            counter!("crawler_filings_processed_total").increment(1);
                            tracing::info!(
                                filing_type = %job.filing_type,
                                title = %job.announcement.title,
                                processed = %paths.processed.display(),
                                "stored filing"
                            );
                        }
                        Err(e) => {
                            counter!("crawler_job_failures_total", "kind" => e.kind())
                                .increment(1);
                            tracing::warn!(
                                id = %job.announcement.id,
                                title = %job.announcement.title,
                                filing_type = %job.filing_type,
                                kind = e.kind(),
                                error = %e,
                                "job failed, dropping"
                            );
                        }
                    }
                }
                tracing::debug!(worker, "worker exiting");
            })
        })
        .collect()
}

async fn process(
    job: &Job,
    resolver: &DocumentResolver,
    store: &ArtifactStore,
) -> Result<StoredPaths, CrawlError> {
    let doc = resolver.resolve(&job.announcement, job.filing_type).await?;
    let text = normalize(&doc.raw_text());
    let company = feed::company_from_title(&job.announcement.title);
    let key = ArtifactKey::stamped_now(&company, &doc.cik, job.filing_type);
    store.store(&key, &doc.raw, &text).await
}
