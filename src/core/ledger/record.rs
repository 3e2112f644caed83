//! Audit record model
//!
//! One [`AuditRecord`] exists per admitted file, keyed by the message id
//! assigned at admission. The record is the unit of queue ordering: files
//! sharing a queue name are processed oldest-timestamp-first, one at a time.

use crate::domain::{MessageId, QueueName};
use serde::{Deserialize, Serialize};

/// Processing status of a file in the audit ledger
///
/// Status moves Queued→Processed exactly once and is never reversed. No
/// intermediate state is persisted: pull-chaining implies an in-flight file,
/// but the conditional Processed transition makes duplicate dispatch of the
/// same next-file harmless, so the two states suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// The file has been admitted and is waiting for, or undergoing, row processing
    Queued,
    /// Row extraction has completed (whatever the row-level outcomes were)
    Processed,
}

/// One audit ledger entry per admitted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Message id assigned at admission; the record's identity
    pub message_id: MessageId,
    /// The submitted file key
    pub filename: String,
    /// Queue this file is serialized on
    pub queue_name: QueueName,
    /// Current processing status
    pub status: FileStatus,
    /// Received-time string (`YYYYMMDDTHHMMSS00`); orders files within a queue
    pub timestamp: String,
}

impl AuditRecord {
    /// Create a new Queued record
    pub fn queued(
        message_id: MessageId,
        filename: impl Into<String>,
        queue_name: QueueName,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            filename: filename.into(),
            queue_name,
            status: FileStatus::Queued,
            timestamp: timestamp.into(),
        }
    }

    /// True once row extraction has completed for this file
    pub fn is_processed(&self) -> bool {
        self.status == FileStatus::Processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_constructor() {
        let record = AuditRecord::queued(
            MessageId::new("m1").unwrap(),
            "FLU_Vaccinations_V5_YGM41_20240101T120000.CSV",
            QueueName::new("EMIS", "FLU"),
            "20240101T12000000",
        );
        assert_eq!(record.status, FileStatus::Queued);
        assert!(!record.is_processed());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&FileStatus::Queued).unwrap(),
            "\"Queued\""
        );
        assert_eq!(
            serde_json::to_string(&FileStatus::Processed).unwrap(),
            "\"Processed\""
        );
    }
}
