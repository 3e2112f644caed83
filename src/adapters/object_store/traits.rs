//! Object storage abstraction
//!
//! The pipeline reads submitted batch files from, and writes acknowledgment
//! reports to, flat object storage addressed by `{bucket}/{key}`. There is no
//! partial-write primitive: report updates replace the whole object.

use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Object storage client trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object body as UTF-8 text
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be read.
    async fn get(&self, bucket: &str, key: &str) -> Result<String>;

    /// Fetch an object body if the object exists
    ///
    /// # Errors
    ///
    /// Returns an error only for failures other than "not found".
    async fn get_optional(&self, bucket: &str, key: &str) -> Result<Option<String>>;

    /// Write an object body, replacing any existing object
    async fn put(&self, bucket: &str, key: &str, body: &str) -> Result<()>;

    /// When the object was last written
    ///
    /// Used to derive the received-time string reported back to suppliers.
    async fn last_modified(&self, bucket: &str, key: &str) -> Result<DateTime<Utc>>;

    /// Move an object within a bucket (copy then delete)
    async fn move_object(&self, bucket: &str, source_key: &str, destination_key: &str)
        -> Result<()>;

    /// List object keys in a bucket under a prefix, sorted
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;
}
