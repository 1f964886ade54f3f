//! # Document Resolver
//! Filing announcement → primary document bytes.
//!
//! EDGAR has no single reliable URL for "the document humans read". The
//! archive directory listing usually names it, but some filings only expose
//! a machine-readable viewer stub, and a few expose nothing indexable at
//! all. Resolution is therefore an ordered-attempt loop: pick the best
//! candidate from `index.json`, then walk a fixed list of alternate
//! patterns until a 200 response without the stub marker appears.

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::error::CrawlError;
use crate::fetch::{FetchedPage, PageFetcher};
use crate::types::{FilingAnnouncement, FilingType, ResolvedDocument};

pub const ARCHIVE_ROOT: &str = "https://www.sec.gov/Archives";

/// Literal marker of the machine-readable-only viewer page.
const STUB_MARKER: &str = "XBRL Viewer";

pub struct DocumentResolver {
    fetcher: Arc<dyn PageFetcher>,
    archive_root: String,
}

impl DocumentResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_archive_root(fetcher, ARCHIVE_ROOT)
    }

    pub fn with_archive_root(fetcher: Arc<dyn PageFetcher>, archive_root: impl Into<String>) -> Self {
        Self {
            fetcher,
            archive_root: archive_root.into(),
        }
    }

    /// Resolve one announcement. Fails fast with a parse error when the
    /// link carries no CIK or accession number; otherwise runs the full
    /// fallback chain.
    pub async fn resolve(
        &self,
        announcement: &FilingAnnouncement,
        filing_type: FilingType,
    ) -> Result<ResolvedDocument, CrawlError> {
        let cik = extract_cik(&announcement.link)?;
        let accession = extract_accession(&announcement.link)?;
        self.resolve_known(&cik, &accession, filing_type).await
    }

    /// Resolution tail shared with the backfill path, for a filing whose
    /// CIK (no leading zeros) and accession number are already known.
    pub async fn resolve_known(
        &self,
        cik: &str,
        accession: &str,
        filing_type: FilingType,
    ) -> Result<ResolvedDocument, CrawlError> {
        let accession_no_dashes = accession.replace('-', "");
        let base = format!(
            "{}/edgar/data/{}/{}",
            self.archive_root, cik, accession_no_dashes
        );

        let primary = match self.index_candidate(&base, filing_type).await {
            Some(name) => format!("{base}/{name}"),
            None => format!("{base}/{}.htm", filing_type.as_lower()),
        };

        // Primary first, then the alternate patterns, in this order.
        let candidates = [
            primary,
            format!("{base}/{}", filing_type.as_lower()),
            format!("{base}/{accession}.txt"),
            format!("{base}/primary-document.htm"),
            format!("{base}/FilingSummary.xml"),
        ];

        let mut attempts = 0usize;
        for url in &candidates {
            attempts += 1;
            match self.fetcher.get(url).await {
                Ok(page) if page.is_ok() && !is_stub(&page) => {
                    return Ok(ResolvedDocument {
                        cik: cik.to_string(),
                        accession_number: accession.to_string(),
                        url: url.clone(),
                        raw: page.body,
                    });
                }
                Ok(page) => {
                    if page.is_ok() {
                        counter!("crawler_stub_pages_total").increment(1);
                        tracing::debug!(url = %url, "viewer stub, trying next candidate");
                    } else {
                        tracing::debug!(url = %url, status = page.status, "candidate rejected");
                    }
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "candidate fetch failed");
                }
            }
        }

        Err(CrawlError::Resolution {
            cik: cik.to_string(),
            accession: accession.to_string(),
            attempts,
        })
    }

    /// Best document name from `{base}/index.json`, or `None` when the
    /// index is unreachable, unparsable, or lists no usable document.
    ///
    /// Two passes over the listing: first a `.htm` whose name contains the
    /// filing-type string, then any `.htm`. `R`-prefixed files are rendered
    /// XBRL fragments and never the primary document. A type match wins
    /// over a generic one regardless of listing order; within a pass the
    /// first match wins.
    async fn index_candidate(&self, base: &str, filing_type: FilingType) -> Option<String> {
        let url = format!("{base}/index.json");
        let page = match self.fetcher.get(&url).await {
            Ok(page) if page.is_ok() => page,
            Ok(page) => {
                tracing::debug!(url = %url, status = page.status, "no archive index");
                return None;
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "archive index fetch failed");
                return None;
            }
        };

        let listing: IndexListing = match serde_json::from_slice(&page.body) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "archive index unparsable");
                return None;
            }
        };

        let items = listing.directory.item;
        let needle = filing_type.as_lower();
        items
            .iter()
            .find(|it| is_document(&it.name) && it.name.to_ascii_lowercase().contains(needle))
            .or_else(|| items.iter().find(|it| is_document(&it.name)))
            .map(|it| it.name.clone())
    }
}

fn is_document(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".htm") && !name.starts_with('R')
}

fn is_stub(page: &FetchedPage) -> bool {
    page.body_text().contains(STUB_MARKER)
}

/// CIK from an announcement link, leading zeros stripped.
pub fn extract_cik(link: &str) -> Result<String, CrawlError> {
    static RE_CIK: OnceCell<Regex> = OnceCell::new();
    let re = RE_CIK.get_or_init(|| Regex::new(r"CIK=(\d+)").expect("static regex"));

    let caps = re.captures(link).ok_or_else(|| CrawlError::Parse {
        what: "CIK",
        input: link.to_string(),
    })?;
    let stripped = caps[1].trim_start_matches('0');
    Ok(if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    })
}

/// Accession number (dashed 10-2-6 form) from an announcement link.
pub fn extract_accession(link: &str) -> Result<String, CrawlError> {
    static RE_ACCESSION: OnceCell<Regex> = OnceCell::new();
    let re =
        RE_ACCESSION.get_or_init(|| Regex::new(r"/(\d{10}-\d{2}-\d{6})/").expect("static regex"));

    re.captures(link)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CrawlError::Parse {
            what: "accession number",
            input: link.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct IndexListing {
    #[serde(default)]
    directory: Directory,
}

#[derive(Debug, Default, Deserialize)]
struct Directory {
    #[serde(default)]
    item: Vec<IndexItem>,
}

#[derive(Debug, Deserialize)]
struct IndexItem {
    #[serde(default)]
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cik_loses_leading_zeros() {
        let link = "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK=0000320193";
        assert_eq!(extract_cik(link).unwrap(), "320193");
    }

    #[test]
    fn accession_requires_slash_delimited_pattern() {
        let link = "https://www.sec.gov/Archives/edgar/data/320193/0000320193-24-000123/doc.htm";
        assert_eq!(extract_accession(link).unwrap(), "0000320193-24-000123");
        assert!(extract_accession("https://example.com/no-accession").is_err());
    }

    #[test]
    fn missing_cik_is_a_parse_error() {
        let err = extract_cik("https://example.com/?foo=1").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn rendered_xbrl_fragments_are_not_documents() {
        assert!(!is_document("R1.htm"));
        assert!(is_document("aapl-20240928.htm"));
        assert!(!is_document("exhibit.txt"));
    }
}
