//! In-memory permission cache
//!
//! Holds a static permission configuration for tests and local runs.

use crate::adapters::cache::traits::{PermissionCache, PermissionsConfig};
use crate::domain::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Permission cache backed by an in-process configuration document
#[derive(Default)]
pub struct MemoryPermissionCache {
    config: RwLock<PermissionsConfig>,
}

impl MemoryPermissionCache {
    /// Create an empty cache (every supplier has no permissions)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache from an existing configuration document
    pub fn with_config(config: PermissionsConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Grant a supplier a set of permissions, replacing any existing grant
    pub async fn grant(&self, supplier: &str, permissions: &[&str]) {
        self.config.write().await.all_permissions.insert(
            supplier.to_string(),
            permissions.iter().map(|p| p.to_string()).collect(),
        );
    }
}

#[async_trait]
impl PermissionCache for MemoryPermissionCache {
    async fn supplier_permissions(&self, supplier: &str) -> Result<Vec<String>> {
        Ok(self.config.read().await.supplier_permissions(supplier))
    }
}
