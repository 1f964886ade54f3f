use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for one crawl job.
///
/// Errors are contained at the job boundary: a failing job is logged with
/// its identifying fields and dropped, never crashing a worker or the
/// poller loop.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A feed document or an identifier pattern could not be parsed.
    #[error("{what} unparsable in `{input}`")]
    Parse { what: &'static str, input: String },

    /// Transport-level failure on a single request attempt.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Every candidate URL was exhausted without a usable document.
    #[error("no usable document for CIK {cik} accession {accession} after {attempts} attempts")]
    Resolution {
        cik: String,
        accession: String,
        attempts: usize,
    },

    /// Artifact write failed after successful resolution.
    #[error("writing {} failed: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CrawlError {
    /// Stable label for logs and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            CrawlError::Parse { .. } => "parse",
            CrawlError::Network { .. } => "network",
            CrawlError::Resolution { .. } => "resolution",
            CrawlError::Storage { .. } => "storage",
        }
    }
}
