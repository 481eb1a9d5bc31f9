//! On-disk blob storage
//!
//! Bytes live under the upload directory as `{content_hash}_{filename}`.
//! Identical content uploaded under the same filename maps to the same
//! path and overwrites it with the same bytes.

use antiplagiat_common::{errors::AppError, ContentHash, Result, DEFAULT_FILENAME};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload directory if needed
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::BlobStorage {
                message: format!("Cannot create {}: {}", self.root.display(), e),
            })
    }

    pub fn path_for(&self, hash: &ContentHash, filename: &str) -> PathBuf {
        self.root
            .join(format!("{}_{}", hash, sanitize_filename(filename)))
    }

    /// Write the bytes and return where they landed
    pub async fn write(&self, hash: &ContentHash, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.init().await?;

        let path = self.path_for(hash, filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::BlobStorage {
                message: format!("Cannot write {}: {}", path.display(), e),
            })?;

        debug!(path = %path.display(), size = bytes.len(), "Blob written");
        Ok(path)
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| AppError::BlobStorage {
            message: format!("Cannot read {}: {}", path.display(), e),
        })
    }
}

/// Reduce a client-supplied filename to its last path component
fn sanitize_filename(filename: &str) -> String {
    let normalized = filename.replace('\\', "/");

    Path::new(&normalized)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}
