// src/feed.rs
//
// Adapter between EDGAR's current-filings Atom feeds and the crawler's
// fixed-shape `FilingAnnouncement`. Feed-format quirks (loose entities,
// the `TYPE - NAME (CIK) (Filer)` title convention) stay isolated here.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::error::CrawlError;
use crate::types::FilingAnnouncement;

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    id: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

/// Parse one Atom document into announcements. Entries missing an id or a
/// link are skipped; they cannot be deduplicated or resolved.
pub fn parse_feed(xml: &str) -> Result<Vec<FilingAnnouncement>, CrawlError> {
    let clean = scrub_html_entities_for_xml(xml);
    let feed: AtomFeed = quick_xml::de::from_str(&clean).map_err(|e| CrawlError::Parse {
        what: "atom feed",
        input: format!("{} ({e})", snippet(xml)),
    })?;

    let mut out = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let Some(id) = entry.id.filter(|s| !s.is_empty()) else {
            tracing::debug!("feed entry without id skipped");
            continue;
        };
        let Some(link) = entry.links.into_iter().find_map(|l| l.href) else {
            tracing::debug!(id = %id, "feed entry without link skipped");
            continue;
        };
        out.push(FilingAnnouncement {
            id,
            title: entry.title.unwrap_or_default(),
            link,
        });
    }
    Ok(out)
}

/// Company name from an EDGAR entry title like
/// `10-K - Apple Inc. (0000320193) (Filer)`: decode entities, drop the
/// leading form-type segment and the trailing parentheticals.
pub fn company_from_title(title: &str) -> String {
    static RE_TRAILING_PARENS: OnceCell<Regex> = OnceCell::new();
    let re = RE_TRAILING_PARENS
        .get_or_init(|| Regex::new(r"\s*\([^()]*\)\s*$").expect("static regex"));

    let decoded = html_escape::decode_html_entities(title);
    let mut name = match decoded.split_once(" - ") {
        Some((_, rest)) => rest.trim().to_string(),
        None => decoded.trim().to_string(),
    };
    loop {
        let stripped = re.replace(&name, "").to_string();
        if stripped == name {
            break;
        }
        name = stripped;
    }
    if name.is_empty() {
        decoded.trim().to_string()
    } else {
        name
    }
}

// EDGAR feeds occasionally carry HTML-only entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

fn snippet(s: &str) -> String {
    s.chars().take(60).collect()
}
