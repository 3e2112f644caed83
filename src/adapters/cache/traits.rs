//! Permission cache abstraction
//!
//! The permission cache is a distributed key-value store populated
//! out-of-band with the supplier→permission configuration. The pipeline only
//! ever reads it.

use crate::domain::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The permission configuration document held in the cache
///
/// Shape: `{"all_permissions": {"EMIS": ["FLU_FULL", ...], ...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Permissions per supplier
    #[serde(default)]
    pub all_permissions: HashMap<String, Vec<String>>,
}

impl PermissionsConfig {
    /// The permission list for a supplier
    ///
    /// Defaults to an empty list, including when the supplier is unknown.
    pub fn supplier_permissions(&self, supplier: &str) -> Vec<String> {
        self.all_permissions
            .get(supplier)
            .cloned()
            .unwrap_or_default()
    }
}

/// Permission cache client trait
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Fetch the permission list for a supplier
    ///
    /// An unknown supplier yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be reached or its content cannot
    /// be decoded.
    async fn supplier_permissions(&self, supplier: &str) -> Result<Vec<String>>;
}
