// src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::types::FilingType;

pub const DEFAULT_CONFIG_PATH: &str = "config/crawler.toml";

const ENV_USER_AGENT: &str = "EDGAR_USER_AGENT";
const ENV_CHECK_INTERVAL_MS: &str = "CHECK_INTERVAL_MS";

/// One feed to poll and the form type its entries carry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSpec {
    pub url: String,
    pub filing_type: FilingType,
}

/// Crawler configuration: TOML file with serde defaults, then env
/// overrides, then validation. Env wins over the file.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Contact-identifying User-Agent required by EDGAR's access policy.
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_archive_root")]
    pub archive_root: String,
    #[serde(default = "default_data_api_root")]
    pub data_api_root: String,
    /// Optional per-request timeout. Unset by default: a hung remote can
    /// then block one worker, matching the crawler's original behavior.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    /// Feeds to poll; empty means the four EDGAR current-filings feeds.
    #[serde(default)]
    pub feeds: Vec<FeedSpec>,
}

fn default_check_interval_ms() -> u64 {
    200
}
fn default_workers() -> usize {
    5
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_dedup_capacity() -> usize {
    1000
}
fn default_raw_dir() -> PathBuf {
    PathBuf::from("raw_data")
}
fn default_processed_dir() -> PathBuf {
    PathBuf::from("processed_data")
}
fn default_archive_root() -> String {
    "https://www.sec.gov/Archives".to_string()
}
fn default_data_api_root() -> String {
    "https://data.sec.gov".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            check_interval_ms: default_check_interval_ms(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            dedup_capacity: default_dedup_capacity(),
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            archive_root: default_archive_root(),
            data_api_root: default_data_api_root(),
            request_timeout_ms: None,
            feeds: Vec::new(),
        }
    }
}

impl CrawlerConfig {
    /// Load from an explicit path, or from `config/crawler.toml` when it
    /// exists, or from defaults. Env overrides and validation apply in
    /// every case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(v) = env::var(ENV_USER_AGENT) {
            if !v.trim().is_empty() {
                self.user_agent = Some(v);
            }
        }
        if let Ok(v) = env::var(ENV_CHECK_INTERVAL_MS) {
            if let Ok(ms) = v.parse() {
                self.check_interval_ms = ms;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.user_agent.as_deref().map_or(true, |s| s.trim().is_empty()) {
            bail!(
                "EDGAR requires a contact-identifying User-Agent; \
                 set {ENV_USER_AGENT} or `user_agent` in the config file"
            );
        }
        if self.workers == 0 {
            bail!("`workers` must be at least 1");
        }
        if self.queue_capacity == 0 {
            bail!("`queue_capacity` must be at least 1");
        }
        Ok(())
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or_default()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Configured feeds, or the four EDGAR current-filings feeds.
    pub fn feeds_or_default(&self) -> Vec<FeedSpec> {
        if !self.feeds.is_empty() {
            return self.feeds.clone();
        }
        FilingType::ALL
            .into_iter()
            .map(|ft| FeedSpec {
                url: current_filings_url(ft),
                filing_type: ft,
            })
            .collect()
    }
}

fn current_filings_url(filing_type: FilingType) -> String {
    format!(
        "https://www.sec.gov/cgi-bin/browse-edgar?action=getcurrent&type={}\
         &company=&dateb=&owner=include&start=0&count=100&output=atom",
        filing_type.as_str()
    )
}
