//! In-memory object store
//!
//! Backs tests and local single-process runs. Objects live in a map keyed by
//! `{bucket}/{key}` behind a single async lock.

use crate::adapters::object_store::traits::ObjectStore;
use crate::domain::{BatchError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    body: String,
    last_modified: DateTime<Utc>,
}

/// Object store held entirely in process memory
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object with an explicit last-modified time
    ///
    /// Tests use this to control the received-time string that ends up in
    /// acknowledgment files.
    pub async fn put_with_timestamp(
        &self,
        bucket: &str,
        key: &str,
        body: &str,
        last_modified: DateTime<Utc>,
    ) {
        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_string(),
                last_modified,
            },
        );
    }

    /// List the keys currently present in a bucket, sorted
    pub async fn list_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<String> {
        self.get_optional(bucket, key)
            .await?
            .ok_or_else(|| BatchError::ObjectStore(format!("Object not found: {bucket}/{key}")))
    }

    async fn get_optional(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.clone()))
    }

    async fn put(&self, bucket: &str, key: &str, body: &str) -> Result<()> {
        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn last_modified(&self, bucket: &str, key: &str) -> Result<DateTime<Utc>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.last_modified)
            .ok_or_else(|| BatchError::ObjectStore(format!("Object not found: {bucket}/{key}")))
    }

    async fn move_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<()> {
        let mut objects = self.objects.write().await;
        let object = objects
            .remove(&(bucket.to_string(), source_key.to_string()))
            .ok_or_else(|| {
                BatchError::ObjectStore(format!("Object not found: {bucket}/{source_key}"))
            })?;
        objects.insert((bucket.to_string(), destination_key.to_string()), object);
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryObjectStore::new();
        store.put("data", "file.csv", "HEADER\n1|2").await.unwrap();
        assert_eq!(store.get("data", "file.csv").await.unwrap(), "HEADER\n1|2");
    }

    #[tokio::test]
    async fn test_get_missing_object_errors() {
        let store = MemoryObjectStore::new();
        assert!(store.get("data", "missing.csv").await.is_err());
        assert!(store
            .get_optional("data", "missing.csv")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_move_object() {
        let store = MemoryObjectStore::new();
        store.put("data", "file.csv", "body").await.unwrap();
        store
            .move_object("data", "file.csv", "processing/file.csv")
            .await
            .unwrap();
        assert!(store.get_optional("data", "file.csv").await.unwrap().is_none());
        assert_eq!(
            store.get("data", "processing/file.csv").await.unwrap(),
            "body"
        );
    }

    #[tokio::test]
    async fn test_seeded_timestamp_is_returned() {
        let store = MemoryObjectStore::new();
        let when = "2024-01-01T12:00:00Z".parse().unwrap();
        store
            .put_with_timestamp("data", "file.csv", "body", when)
            .await;
        assert_eq!(store.last_modified("data", "file.csv").await.unwrap(), when);
    }
}
