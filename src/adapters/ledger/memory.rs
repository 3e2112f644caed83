//! In-memory audit ledger store
//!
//! A map keyed by message id behind one async lock, so the conditional
//! insert and the conditional Processed transition are atomic.

use crate::adapters::ledger::traits::{LedgerStore, MarkOutcome};
use crate::core::ledger::record::{AuditRecord, FileStatus};
use crate::domain::{BatchError, MessageId, QueueName, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Ledger store held entirely in process memory
#[derive(Default)]
pub struct MemoryLedgerStore {
    records: RwLock<HashMap<String, AuditRecord>>,
}

impl MemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert(&self, record: AuditRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let key = record.message_id.as_str().to_string();
        if records.contains_key(&key) {
            return Err(BatchError::Ledger(format!(
                "Audit record already exists for message id {key}"
            )));
        }
        records.insert(key, record);
        Ok(())
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<AuditRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.filename == filename)
            .cloned())
    }

    async fn queued_for(&self, queue_name: &QueueName) -> Result<Vec<AuditRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.status == FileStatus::Queued && &r.queue_name == queue_name)
            .cloned()
            .collect())
    }

    async fn mark_processed(&self, message_id: &MessageId) -> Result<MarkOutcome> {
        let mut records = self.records.write().await;
        match records.get_mut(message_id.as_str()) {
            None => Ok(MarkOutcome::NotFound),
            Some(record) if record.status == FileStatus::Processed => {
                Ok(MarkOutcome::AlreadyProcessed)
            }
            Some(record) => {
                record.status = FileStatus::Processed;
                Ok(MarkOutcome::Updated)
            }
        }
    }

    async fn all_records(&self) -> Result<Vec<AuditRecord>> {
        let mut records: Vec<AuditRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message_id: &str, filename: &str, timestamp: &str) -> AuditRecord {
        AuditRecord::queued(
            MessageId::new(message_id).unwrap(),
            filename,
            QueueName::new("EMIS", "FLU"),
            timestamp,
        )
    }

    #[tokio::test]
    async fn test_duplicate_message_id_insert_fails() {
        let store = MemoryLedgerStore::new();
        store.insert(record("m1", "a.csv", "1")).await.unwrap();
        assert!(store.insert(record("m1", "b.csv", "2")).await.is_err());
    }

    #[tokio::test]
    async fn test_find_by_filename() {
        let store = MemoryLedgerStore::new();
        store.insert(record("m1", "a.csv", "1")).await.unwrap();
        let found = store.find_by_filename("a.csv").await.unwrap().unwrap();
        assert_eq!(found.message_id.as_str(), "m1");
        assert!(store.find_by_filename("b.csv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_processed_transitions() {
        let store = MemoryLedgerStore::new();
        store.insert(record("m1", "a.csv", "1")).await.unwrap();

        let message_id = MessageId::new("m1").unwrap();
        assert_eq!(
            store.mark_processed(&message_id).await.unwrap(),
            MarkOutcome::Updated
        );
        assert_eq!(
            store.mark_processed(&message_id).await.unwrap(),
            MarkOutcome::AlreadyProcessed
        );
        assert_eq!(
            store
                .mark_processed(&MessageId::new("missing").unwrap())
                .await
                .unwrap(),
            MarkOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_queued_for_excludes_processed() {
        let store = MemoryLedgerStore::new();
        store.insert(record("m1", "a.csv", "1")).await.unwrap();
        store.insert(record("m2", "b.csv", "2")).await.unwrap();
        store
            .mark_processed(&MessageId::new("m1").unwrap())
            .await
            .unwrap();

        let queued = store.queued_for(&QueueName::new("EMIS", "FLU")).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].message_id.as_str(), "m2");
    }
}
