//! Record store abstraction
//!
//! The record store holds canonical immunisation records keyed internally by
//! record id and looked up by their `(system, value)` identifier pair.
//! Uniqueness of that pair among non-deleted records is the pipeline's one
//! strong-consistency requirement: the uniqueness check and the insert MUST
//! be a single conditional operation, never a separate read then write.
//! Deletion is a tombstone; records are never physically removed.

use crate::domain::{CanonicalRecord, RecordId, RecordIdentifier, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A record as held in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Store-assigned record id
    pub id: RecordId,
    /// The record's identifier pair
    pub identifier: RecordIdentifier,
    /// Supplier system that last wrote the record
    pub supplier: String,
    /// Monotonic version, incremented on every observable state change
    pub version: u32,
    /// Logical deletion marker
    pub deleted: bool,
    /// The canonical record content
    pub record: CanonicalRecord,
}

/// Result of a conditional create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was created with this id
    Inserted(RecordId),
    /// A non-deleted record already carries the identifier pair
    IdentifierExists,
}

/// Result of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record content changed; the version advanced
    Updated { id: RecordId, version: u32 },
    /// The payload was identical to the stored content; nothing changed
    Unchanged { id: RecordId, version: u32 },
    /// No non-deleted record carries the identifier pair
    NotFound,
}

/// Result of a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record was tombstoned
    Deleted(RecordId),
    /// No non-deleted record carries the identifier pair
    NotFound,
}

/// Record store client trait
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record, conditional on no non-deleted record carrying its
    /// identifier pair
    ///
    /// The check and the insert are one atomic operation.
    async fn insert_if_identifier_absent(
        &self,
        record: CanonicalRecord,
        supplier: &str,
    ) -> Result<InsertOutcome>;

    /// Replace the content of the existing non-deleted record carrying the
    /// record's identifier pair
    ///
    /// Idempotent: re-applying an identical payload is reported as
    /// [`UpdateOutcome::Unchanged`] and is not an observable state change.
    async fn update(&self, record: CanonicalRecord, supplier: &str) -> Result<UpdateOutcome>;

    /// Tombstone the existing non-deleted record carrying the identifier pair
    async fn tombstone(&self, identifier: &RecordIdentifier) -> Result<DeleteOutcome>;

    /// Look up a record (deleted or not) by its identifier pair
    async fn find_by_identifier(
        &self,
        identifier: &RecordIdentifier,
    ) -> Result<Option<StoredRecord>>;
}
