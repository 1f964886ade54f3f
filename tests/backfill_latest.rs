// tests/backfill_latest.rs
use std::sync::Arc;

use sec_filing_crawler::backfill::fetch_latest;
use sec_filing_crawler::error::CrawlError;
use sec_filing_crawler::fetch::ScriptedFetcher;
use sec_filing_crawler::resolver::DocumentResolver;
use sec_filing_crawler::storage::ArtifactStore;
use sec_filing_crawler::types::FilingType;

const SUBMISSIONS_JSON: &str = include_str!("fixtures/submissions_0000320193.json");

const DATA_ROOT: &str = "https://data.test";
const ARCHIVE_ROOT: &str = "https://archives.test";
// Newest 10-K in the fixture: 0000320193-23-000106.
const BASE: &str = "https://archives.test/edgar/data/320193/000032019323000106";

#[tokio::test]
async fn picks_the_newest_matching_form_and_stamps_the_filing_date() {
    let listing = r#"{"directory":{"item":[{"name":"aapl-20230930.htm"}]}}"#;
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .route(
                &format!("{DATA_ROOT}/submissions/CIK0000320193.json"),
                200,
                SUBMISSIONS_JSON,
            )
            .route(&format!("{BASE}/index.json"), 200, listing)
            .route(
                &format!("{BASE}/aapl-20230930.htm"),
                200,
                "<html>Annual&nbsp;Report \u{2014} FY2023</html>",
            ),
    );
    let resolver = DocumentResolver::with_archive_root(fetcher.clone(), ARCHIVE_ROOT);
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(&tmp.path().join("raw"), &tmp.path().join("proc"))
        .await
        .unwrap();

    let paths = fetch_latest(
        &*fetcher,
        &resolver,
        &store,
        DATA_ROOT,
        "0000320193",
        FilingType::TenK,
    )
    .await
    .expect("backfill ok");

    let name = paths.raw.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(name, "Apple_Inc._320193_10-K_20231103.txt");
    assert_eq!(
        tokio::fs::read_to_string(&paths.processed).await.unwrap(),
        "Annual Report FY2023"
    );
}

#[tokio::test]
async fn no_matching_form_is_a_resolution_error() {
    let fetcher = ScriptedFetcher::new().route(
        &format!("{DATA_ROOT}/submissions/CIK0000320193.json"),
        200,
        SUBMISSIONS_JSON,
    );
    let fetcher = Arc::new(fetcher);
    let resolver = DocumentResolver::with_archive_root(fetcher.clone(), ARCHIVE_ROOT);
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(&tmp.path().join("raw"), &tmp.path().join("proc"))
        .await
        .unwrap();

    // The fixture holds 10-Q and 10-K filings only.
    let err = fetch_latest(
        &*fetcher,
        &resolver,
        &store,
        DATA_ROOT,
        "320193",
        FilingType::SixK,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CrawlError::Resolution { .. }));
    // Only the submissions lookup went out.
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn failed_submissions_lookup_is_a_network_error() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let resolver = DocumentResolver::with_archive_root(fetcher.clone(), ARCHIVE_ROOT);
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(&tmp.path().join("raw"), &tmp.path().join("proc"))
        .await
        .unwrap();

    let err = fetch_latest(
        &*fetcher,
        &resolver,
        &store,
        DATA_ROOT,
        "320193",
        FilingType::TenK,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), "network");
}
