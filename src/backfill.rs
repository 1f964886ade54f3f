//! # Backfill
//! One-shot fetch of a company's most recent filing of a given type via
//! the submissions API, reusing the crawler's resolution tail and storing
//! artifacts keyed by the filing date instead of the crawl time.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::CrawlError;
use crate::fetch::PageFetcher;
use crate::normalize::normalize;
use crate::resolver::DocumentResolver;
use crate::storage::{ArtifactStore, StoredPaths};
use crate::types::{ArtifactKey, FilingType};

pub const DATA_API_ROOT: &str = "https://data.sec.gov";

// `filings.recent` is a set of parallel arrays, newest first.
#[derive(Debug, Deserialize)]
struct Submissions {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    filings: Filings,
}

#[derive(Debug, Default, Deserialize)]
struct Filings {
    #[serde(default)]
    recent: Recent,
}

#[derive(Debug, Default, Deserialize)]
struct Recent {
    #[serde(default)]
    form: Vec<String>,
    #[serde(default, rename = "accessionNumber")]
    accession_number: Vec<String>,
    #[serde(default, rename = "filingDate")]
    filing_date: Vec<String>,
}

/// Fetch, normalize, and store the newest `filing_type` filing of `cik`.
/// The CIK may carry leading zeros; the submissions lookup pads it back to
/// ten digits as the API requires.
pub async fn fetch_latest(
    fetcher: &dyn PageFetcher,
    resolver: &DocumentResolver,
    store: &ArtifactStore,
    data_api_root: &str,
    cik: &str,
    filing_type: FilingType,
) -> Result<StoredPaths, CrawlError> {
    let stripped = cik.trim_start_matches('0');
    let cik = if stripped.is_empty() { "0" } else { stripped };

    let url = format!("{data_api_root}/submissions/CIK{cik:0>10}.json");
    tracing::debug!(%url, "looking up company submissions");
    let page = fetcher.get(&url).await?;
    if !page.is_ok() {
        return Err(CrawlError::Network {
            url,
            source: format!("HTTP {}", page.status).into(),
        });
    }

    let subs: Submissions =
        serde_json::from_slice(&page.body).map_err(|e| CrawlError::Parse {
            what: "submissions response",
            input: e.to_string(),
        })?;
    let company = subs
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("Company_{cik}"));

    let recent = subs.filings.recent;
    let Some((accession, filing_date)) = recent
        .form
        .iter()
        .position(|form| form == filing_type.as_str())
        .and_then(|i| {
            Some((
                recent.accession_number.get(i)?.clone(),
                recent.filing_date.get(i).cloned(),
            ))
        })
    else {
        tracing::warn!(%company, %filing_type, "no matching filing in recent submissions");
        return Err(CrawlError::Resolution {
            cik: cik.to_string(),
            accession: "none".to_string(),
            attempts: 0,
        });
    };

    let doc = resolver.resolve_known(cik, &accession, filing_type).await?;
    let text = normalize(&doc.raw_text());

    let key = filing_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|date| ArtifactKey::for_date(&company, &doc.cik, filing_type, date))
        .unwrap_or_else(|| ArtifactKey::stamped_now(&company, &doc.cik, filing_type));

    let paths = store.store(&key, &doc.raw, &text).await?;
    tracing::info!(
        %company,
        %filing_type,
        accession = %doc.accession_number,
        raw = %paths.raw.display(),
        "backfilled filing"
    );
    Ok(paths)
}
