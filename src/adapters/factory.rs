//! Service adapter factory
//!
//! Factory functions that build the concrete adapter implementations
//! selected by configuration. Every pipeline component receives its
//! dependencies as trait objects constructed here, so nothing in the core
//! touches a backend type directly.

use crate::adapters::cache::{
    BucketPermissionCache, HttpPermissionCache, MemoryPermissionCache, PermissionCache,
};
use crate::adapters::object_store::{FsObjectStore, MemoryObjectStore, ObjectStore};
use crate::config::{CacheBackend, StorageBackend, VaxbatchConfig};
use crate::domain::{BatchError, Result};
use std::sync::Arc;

/// Create the object store selected by `storage.backend`
///
/// # Errors
///
/// Returns a configuration error if the filesystem backend is selected
/// without a root directory.
pub fn create_object_store(config: &VaxbatchConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::info!("Creating in-memory object store");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
        StorageBackend::Filesystem => {
            let root = config.storage.root_dir.as_ref().ok_or_else(|| {
                BatchError::Configuration(
                    "storage.root_dir is required for the filesystem backend".to_string(),
                )
            })?;
            tracing::info!(root = %root, "Creating filesystem object store");
            Ok(Arc::new(FsObjectStore::new(root)))
        }
    }
}

/// Create the permission cache client selected by `cache.backend`
///
/// The bucket backend reads the permission document from the config bucket
/// through the given object store.
///
/// # Errors
///
/// Returns a configuration error if the HTTP client cannot be built.
pub fn create_permission_cache(
    config: &VaxbatchConfig,
    object_store: &Arc<dyn ObjectStore>,
) -> Result<Arc<dyn PermissionCache>> {
    match config.cache.backend {
        CacheBackend::Memory => {
            tracing::info!("Creating in-memory permission cache");
            Ok(Arc::new(MemoryPermissionCache::new()))
        }
        CacheBackend::Http => {
            tracing::info!(endpoint = %config.cache.endpoint, "Creating HTTP permission cache client");
            Ok(Arc::new(HttpPermissionCache::new(&config.cache)?))
        }
        CacheBackend::Bucket => {
            tracing::info!(bucket = %config.storage.config_bucket, "Creating bucket-backed permission cache");
            Ok(Arc::new(BucketPermissionCache::new(
                object_store.clone(),
                config.storage.config_bucket.clone(),
            )))
        }
    }
}
