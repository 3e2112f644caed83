//! Bucket-backed permission cache
//!
//! Reads the permission configuration document straight from the config
//! bucket in object storage. This is the same document the out-of-band sync
//! job loads into the distributed cache; reading it directly lets a single
//! process run without a cache deployment.

use crate::adapters::cache::traits::{PermissionCache, PermissionsConfig};
use crate::adapters::object_store::ObjectStore;
use crate::domain::{BatchError, CacheError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Key of the permission configuration document
const PERMISSIONS_CONFIG_KEY: &str = "permissions_config.json";

/// Permission cache reading from the config bucket
pub struct BucketPermissionCache {
    object_store: Arc<dyn ObjectStore>,
    config_bucket: String,
}

impl BucketPermissionCache {
    /// Create a cache reading from the given config bucket
    pub fn new(object_store: Arc<dyn ObjectStore>, config_bucket: impl Into<String>) -> Self {
        Self {
            object_store,
            config_bucket: config_bucket.into(),
        }
    }
}

#[async_trait]
impl PermissionCache for BucketPermissionCache {
    async fn supplier_permissions(&self, supplier: &str) -> Result<Vec<String>> {
        let body = self
            .object_store
            .get_optional(&self.config_bucket, PERMISSIONS_CONFIG_KEY)
            .await?
            .unwrap_or_default();

        if body.is_empty() {
            tracing::warn!(
                bucket = %self.config_bucket,
                "No permission configuration found; all suppliers unpermissioned"
            );
            return Ok(Vec::new());
        }

        let config: PermissionsConfig = serde_json::from_str(&body)
            .map_err(|e| BatchError::Cache(CacheError::InvalidResponse(e.to_string())))?;
        Ok(config.supplier_permissions(supplier))
    }
}
