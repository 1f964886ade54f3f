// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod backfill;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod normalize;
pub mod poller;
pub mod pool;
pub mod ratelimit;
pub mod resolver;
pub mod shutdown;
pub mod storage;
pub mod telemetry;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::config::{CrawlerConfig, FeedSpec};
pub use crate::crawler::Crawler;
pub use crate::error::CrawlError;
pub use crate::types::{ArtifactKey, FilingAnnouncement, FilingType, Job, ResolvedDocument};
