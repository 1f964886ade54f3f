// tests/storage_artifacts.rs
use sec_filing_crawler::storage::ArtifactStore;
use sec_filing_crawler::types::{ArtifactKey, FilingType};

#[tokio::test]
async fn both_artifacts_land_under_the_same_name() {
    let tmp = tempfile::tempdir().unwrap();
    let raw_dir = tmp.path().join("raw_data");
    let processed_dir = tmp.path().join("processed_data");
    let store = ArtifactStore::open(&raw_dir, &processed_dir).await.unwrap();

    let key = ArtifactKey {
        company: "Apple Inc.".into(),
        cik: "320193".into(),
        filing_type: FilingType::TenK,
        stamp: "20240131_120000".into(),
    };
    let raw = b"<html>Annual Report</html>".to_vec();
    let paths = store.store(&key, &raw, "Annual Report").await.unwrap();

    assert_eq!(
        paths.raw,
        raw_dir.join("Apple_Inc._320193_10-K_20240131_120000.txt")
    );
    assert_eq!(
        paths.processed,
        processed_dir.join("Apple_Inc._320193_10-K_20240131_120000.txt")
    );
    // Raw keeps the exact fetched bytes; processed carries the clean text.
    assert_eq!(tokio::fs::read(&paths.raw).await.unwrap(), raw);
    assert_eq!(
        tokio::fs::read_to_string(&paths.processed).await.unwrap(),
        "Annual Report"
    );
}

#[tokio::test]
async fn path_hostile_company_names_are_defused() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(&tmp.path().join("raw"), &tmp.path().join("proc"))
        .await
        .unwrap();

    let key = ArtifactKey {
        company: "Acme/Sub: \"Holdings\"".into(),
        cik: "99".into(),
        filing_type: FilingType::EightK,
        stamp: "20240131".into(),
    };
    let paths = store.store(&key, b"x", "x").await.unwrap();
    let name = paths.raw.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(name, "Acme_Sub___Holdings__99_8-K_20240131.txt");
    assert!(paths.raw.exists());
}

#[tokio::test]
async fn unwritable_target_is_a_storage_error() {
    let tmp = tempfile::tempdir().unwrap();
    let raw_dir = tmp.path().join("raw");
    let processed_dir = tmp.path().join("proc");
    let store = ArtifactStore::open(&raw_dir, &processed_dir).await.unwrap();

    // Removing the directory after open forces the write to fail.
    tokio::fs::remove_dir(&raw_dir).await.unwrap();
    let key = ArtifactKey {
        company: "X".into(),
        cik: "1".into(),
        filing_type: FilingType::SixK,
        stamp: "20240131".into(),
    };
    let err = store.store(&key, b"x", "x").await.unwrap_err();
    assert_eq!(err.kind(), "storage");
}
