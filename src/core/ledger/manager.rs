//! Audit ledger state machine
//!
//! Thin coordinator over a [`LedgerStore`]. No business logic beyond the
//! Queued→Processed transition and the two lookup relations that queue
//! ordering and duplicate detection rely on.

use crate::adapters::ledger::traits::{LedgerStore, MarkOutcome};
use crate::core::ledger::record::AuditRecord;
use crate::domain::{MessageId, QueueName, Result};
use std::sync::Arc;

/// Audit ledger over a storage backend
pub struct AuditLedger {
    store: Arc<dyn LedgerStore>,
}

impl AuditLedger {
    /// Create a new ledger with a storage backend
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Insert a Queued record for a newly admitted file
    ///
    /// # Errors
    ///
    /// Propagates any storage failure: silently losing this record would
    /// break one-file-at-a-time ordering for the queue.
    pub async fn create(
        &self,
        message_id: MessageId,
        filename: &str,
        queue_name: QueueName,
        timestamp: &str,
    ) -> Result<()> {
        let record = AuditRecord::queued(message_id.clone(), filename, queue_name, timestamp);
        self.store.insert(record).await?;
        tracing::info!(
            file_key = %filename,
            message_id = %message_id,
            "File added to audit ledger"
        );
        Ok(())
    }

    /// Look up a record by filename
    ///
    /// Used to detect a resubmission of an identically-named file.
    pub async fn find_by_filename(&self, filename: &str) -> Result<Option<AuditRecord>> {
        self.store.find_by_filename(filename).await
    }

    /// The Queued record with the smallest timestamp for a queue name
    pub async fn find_oldest_queued(&self, queue_name: &QueueName) -> Result<Option<AuditRecord>> {
        let mut queued = self.store.queued_for(queue_name).await?;
        queued.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(queued.into_iter().next())
    }

    /// Conditionally transition a record from Queued to Processed
    ///
    /// Idempotent: calling this for an already-Processed or unknown record
    /// logs and reports the outcome without corrupting state.
    pub async fn mark_processed(&self, message_id: &MessageId) -> Result<MarkOutcome> {
        let outcome = self.store.mark_processed(message_id).await?;
        match outcome {
            MarkOutcome::Updated => {
                tracing::info!(message_id = %message_id, "Audit status updated to Processed");
            }
            MarkOutcome::AlreadyProcessed => {
                tracing::warn!(message_id = %message_id, "Audit record was already Processed");
            }
            MarkOutcome::NotFound => {
                tracing::warn!(message_id = %message_id, "No audit record found to mark Processed");
            }
        }
        Ok(outcome)
    }

    /// Mark the record for a filename as Processed, reusing the previously
    /// recorded message id and queue name
    ///
    /// This is the resubmission path: a second file under a known name does
    /// not get a second record, its existing record transitions instead.
    /// Returns the record's queue name so the caller can advance the queue.
    pub async fn mark_processed_by_filename(&self, filename: &str) -> Result<Option<QueueName>> {
        match self.store.find_by_filename(filename).await? {
            Some(record) => {
                self.mark_processed(&record.message_id).await?;
                Ok(Some(record.queue_name))
            }
            None => {
                tracing::warn!(file_key = %filename, "No audit record found for filename");
                Ok(None)
            }
        }
    }

    /// All ledger records, oldest first
    pub async fn all_records(&self) -> Result<Vec<AuditRecord>> {
        self.store.all_records().await
    }
}
