//! In-memory record store
//!
//! A map keyed by the identifier pair behind one async write lock. Every
//! mutating operation takes the write lock for its whole check-and-write,
//! which is what makes `insert_if_identifier_absent` atomic here.

use crate::adapters::store::traits::{
    DeleteOutcome, InsertOutcome, RecordStore, StoredRecord, UpdateOutcome,
};
use crate::domain::{CanonicalRecord, RecordId, RecordIdentifier, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Record store held entirely in process memory
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<(String, String), StoredRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn key(identifier: &RecordIdentifier) -> (String, String) {
        (identifier.system.clone(), identifier.value.clone())
    }

    /// Number of non-deleted records currently held
    pub async fn live_count(&self) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|r| !r.deleted)
            .count()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_if_identifier_absent(
        &self,
        record: CanonicalRecord,
        supplier: &str,
    ) -> Result<InsertOutcome> {
        let mut records = self.records.write().await;
        let key = Self::key(&record.identifier);

        if records.get(&key).map(|r| !r.deleted).unwrap_or(false) {
            return Ok(InsertOutcome::IdentifierExists);
        }

        let id = RecordId::generate();
        records.insert(
            key,
            StoredRecord {
                id: id.clone(),
                identifier: record.identifier.clone(),
                supplier: supplier.to_string(),
                version: 1,
                deleted: false,
                record,
            },
        );
        Ok(InsertOutcome::Inserted(id))
    }

    async fn update(&self, record: CanonicalRecord, supplier: &str) -> Result<UpdateOutcome> {
        let mut records = self.records.write().await;
        let key = Self::key(&record.identifier);

        match records.get_mut(&key) {
            Some(stored) if !stored.deleted => {
                if stored.record == record {
                    return Ok(UpdateOutcome::Unchanged {
                        id: stored.id.clone(),
                        version: stored.version,
                    });
                }
                stored.record = record;
                stored.supplier = supplier.to_string();
                stored.version += 1;
                Ok(UpdateOutcome::Updated {
                    id: stored.id.clone(),
                    version: stored.version,
                })
            }
            _ => Ok(UpdateOutcome::NotFound),
        }
    }

    async fn tombstone(&self, identifier: &RecordIdentifier) -> Result<DeleteOutcome> {
        let mut records = self.records.write().await;

        match records.get_mut(&Self::key(identifier)) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                stored.version += 1;
                Ok(DeleteOutcome::Deleted(stored.id.clone()))
            }
            _ => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn find_by_identifier(
        &self,
        identifier: &RecordIdentifier,
    ) -> Result<Option<StoredRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&Self::key(identifier))
            .cloned())
    }
}
