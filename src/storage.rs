// src/storage.rs
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::fs;

use crate::error::CrawlError;
use crate::types::ArtifactKey;

/// Where both artifacts of one filing landed.
#[derive(Debug, Clone)]
pub struct StoredPaths {
    pub raw: PathBuf,
    pub processed: PathBuf,
}

/// Durable store for fetched filings: exact raw bytes in one directory,
/// normalized text under the same name in another. Downstream analyzers
/// consume the processed directory.
pub struct ArtifactStore {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl ArtifactStore {
    /// Create both directories if needed and return the store.
    pub async fn open(raw_dir: &Path, processed_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(raw_dir)
            .await
            .with_context(|| format!("creating {}", raw_dir.display()))?;
        fs::create_dir_all(processed_dir)
            .await
            .with_context(|| format!("creating {}", processed_dir.display()))?;
        Ok(Self {
            raw_dir: raw_dir.to_path_buf(),
            processed_dir: processed_dir.to_path_buf(),
        })
    }

    /// Write both artifacts under the key's file name. The raw write
    /// happens first; a failure on either write fails the job.
    pub async fn store(
        &self,
        key: &ArtifactKey,
        raw: &[u8],
        text: &str,
    ) -> Result<StoredPaths, CrawlError> {
        let name = key.file_name();

        let raw_path = self.raw_dir.join(&name);
        fs::write(&raw_path, raw)
            .await
            .map_err(|e| CrawlError::Storage {
                path: raw_path.clone(),
                source: e,
            })?;

        let processed_path = self.processed_dir.join(&name);
        fs::write(&processed_path, text)
            .await
            .map_err(|e| CrawlError::Storage {
                path: processed_path.clone(),
                source: e,
            })?;

        Ok(StoredPaths {
            raw: raw_path,
            processed: processed_path,
        })
    }
}
