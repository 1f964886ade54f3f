// src/types.rs
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Regulatory form types the crawler watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingType {
    #[serde(rename = "10-K")]
    TenK,
    #[serde(rename = "10-Q")]
    TenQ,
    #[serde(rename = "8-K")]
    EightK,
    #[serde(rename = "6-K")]
    SixK,
}

impl FilingType {
    pub const ALL: [FilingType; 4] = [
        FilingType::TenK,
        FilingType::TenQ,
        FilingType::EightK,
        FilingType::SixK,
    ];

    /// Canonical form name as EDGAR spells it, e.g. `10-K`.
    pub fn as_str(self) -> &'static str {
        match self {
            FilingType::TenK => "10-K",
            FilingType::TenQ => "10-Q",
            FilingType::EightK => "8-K",
            FilingType::SixK => "6-K",
        }
    }

    /// Lowercase form used in archive document names, e.g. `10-k.htm`.
    pub fn as_lower(self) -> &'static str {
        match self {
            FilingType::TenK => "10-k",
            FilingType::TenQ => "10-q",
            FilingType::EightK => "8-k",
            FilingType::SixK => "6-k",
        }
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "10-K" => Ok(FilingType::TenK),
            "10-Q" => Ok(FilingType::TenQ),
            "8-K" => Ok(FilingType::EightK),
            "6-K" => Ok(FilingType::SixK),
            _ => Err(format!(
                "unknown filing type `{s}` (expected 10-K, 10-Q, 8-K or 6-K)"
            )),
        }
    }
}

/// One entry from a current-filings feed. `id` is the feed-native unique
/// identifier and drives deduplication; the document URL is derived from
/// `link` during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingAnnouncement {
    pub id: String,
    pub title: String,
    pub link: String,
}

/// Unit of work handed from the poller to exactly one worker.
#[derive(Debug, Clone)]
pub struct Job {
    pub announcement: FilingAnnouncement,
    pub filing_type: FilingType,
}

/// Outcome of resolving one announcement to its primary document.
/// `cik` carries no leading zeros.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub cik: String,
    pub accession_number: String,
    pub url: String,
    pub raw: Vec<u8>,
}

impl ResolvedDocument {
    /// Lossy text view of the raw bytes, for normalization.
    pub fn raw_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

/// Naming key shared by the raw and processed artifacts of one filing.
#[derive(Debug, Clone)]
pub struct ArtifactKey {
    pub company: String,
    pub cik: String,
    pub filing_type: FilingType,
    pub stamp: String,
}

impl ArtifactKey {
    /// Key for a filing crawled live, stamped with the current time.
    pub fn stamped_now(company: &str, cik: &str, filing_type: FilingType) -> Self {
        Self {
            company: company.to_string(),
            cik: cik.to_string(),
            filing_type,
            stamp: Utc::now().format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    /// Key for a backfilled filing, stamped with its filing date.
    pub fn for_date(company: &str, cik: &str, filing_type: FilingType, date: NaiveDate) -> Self {
        Self {
            company: company.to_string(),
            cik: cik.to_string(),
            filing_type,
            stamp: date.format("%Y%m%d").to_string(),
        }
    }

    /// `{company}_{cik}_{type}_{stamp}.txt`, with the free-form components
    /// reduced to filesystem-safe characters.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}.txt",
            sanitize_component(&self.company),
            sanitize_component(&self.cik),
            self.filing_type.as_str(),
            self.stamp
        )
    }
}

/// Company names can contain path-hostile characters; keep `[A-Za-z0-9._-]`
/// and map everything else to `_`.
fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
