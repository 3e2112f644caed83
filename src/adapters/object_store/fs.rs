//! Filesystem-backed object store
//!
//! Maps `{bucket}/{key}` onto a directory tree under a configured root.
//! Used by the CLI to drive the pipeline against local files; key prefixes
//! such as `ack/` and `processing/` become subdirectories.

use crate::adapters::object_store::traits::ObjectStore;
use crate::domain::{BatchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Object store rooted at a local directory
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<String> {
        let path = self.object_path(bucket, key);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BatchError::ObjectStore(format!("Failed to read {}: {e}", path.display())))
    }

    async fn get_optional(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        let path = self.object_path(bucket, key);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BatchError::ObjectStore(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: &str) -> Result<()> {
        let path = self.object_path(bucket, key);
        Self::ensure_parent(&path).await?;
        tokio::fs::write(&path, body).await.map_err(|e| {
            BatchError::ObjectStore(format!("Failed to write {}: {e}", path.display()))
        })
    }

    async fn last_modified(&self, bucket: &str, key: &str) -> Result<DateTime<Utc>> {
        let path = self.object_path(bucket, key);
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            BatchError::ObjectStore(format!("Failed to stat {}: {e}", path.display()))
        })?;
        let modified = metadata.modified().map_err(|e| {
            BatchError::ObjectStore(format!("No modification time for {}: {e}", path.display()))
        })?;
        Ok(DateTime::<Utc>::from(modified))
    }

    async fn move_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<()> {
        let source = self.object_path(bucket, source_key);
        let destination = self.object_path(bucket, destination_key);
        Self::ensure_parent(&destination).await?;
        tokio::fs::rename(&source, &destination).await.map_err(|e| {
            BatchError::ObjectStore(format!(
                "Failed to move {} to {}: {e}",
                source.display(),
                destination.display()
            ))
        })
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let bucket_root = self.root.join(bucket);
        if !bucket_root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let mut pending = vec![bucket_root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
                BatchError::ObjectStore(format!("Failed to list {}: {e}", dir.display()))
            })?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                BatchError::ObjectStore(format!("Failed to list {}: {e}", dir.display()))
            })? {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&bucket_root) {
                    let key = relative.to_string_lossy().replace('\\', "/");
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
