//! Audit ledger storage abstraction
//!
//! The ledger is a table with two lookup relations: by filename (duplicate
//! detection) and by `(queue_name, status)` (queue ordering). Writes are
//! single-writer per record: admission inserts Queued, row processing flips
//! to Processed.

use crate::core::ledger::record::AuditRecord;
use crate::domain::{MessageId, QueueName, Result};
use async_trait::async_trait;

/// Result of a conditional Processed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The record moved Queued→Processed
    Updated,
    /// The record was already Processed; the call was a no-op
    AlreadyProcessed,
    /// No record exists for the message id
    NotFound,
}

/// Audit ledger storage trait
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert a new record, conditional on the message id being absent
    ///
    /// # Errors
    ///
    /// Returns an error if the record already exists or the write fails.
    /// Losing this write breaks queue ordering, so callers must propagate.
    async fn insert(&self, record: AuditRecord) -> Result<()>;

    /// Look up a record by filename
    async fn find_by_filename(&self, filename: &str) -> Result<Option<AuditRecord>>;

    /// All Queued records for a queue name, in no particular order
    async fn queued_for(&self, queue_name: &QueueName) -> Result<Vec<AuditRecord>>;

    /// Conditionally transition a record from Queued to Processed
    ///
    /// Must not corrupt state when the record is missing or already
    /// Processed; both cases are reported through [`MarkOutcome`].
    async fn mark_processed(&self, message_id: &MessageId) -> Result<MarkOutcome>;

    /// All records in the ledger, for status reporting
    async fn all_records(&self) -> Result<Vec<AuditRecord>>;
}
