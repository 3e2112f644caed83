//! Admission control
//!
//! Validates an incoming file-arrival notification, authorizes the supplier,
//! records the file in the audit ledger and enqueues it for row processing.
//! Admission never reads the file body: failures here can only be reported
//! through a single-row infrastructure acknowledgment, because no row detail
//! exists yet.

use crate::adapters::cache::PermissionCache;
use crate::adapters::object_store::ObjectStore;
use crate::adapters::queue::FileQueue;
use crate::config::StorageConfig;
use crate::core::ack::AckAccumulator;
use crate::core::ledger::{AuditLedger, AuditRecord};
use crate::domain::{
    has_any_vaccine_permission, BatchError, FileKey, FileQueueMessage, FileRejection,
    FileRejectionKind, MessageId, QueueName, Result,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Placeholder written into the acknowledgment when admission failed before
/// a message id could be assigned
const MESSAGE_ID_UNAVAILABLE: &str = "Message id was not created";

/// Outcome of handling one arrival notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalOutcome {
    /// The file was validated, ledgered and enqueued
    Admitted {
        message_id: MessageId,
        queue_name: QueueName,
    },
    /// The file was rejected; an infrastructure acknowledgment was uploaded
    Rejected(FileRejection),
    /// The object was a cache configuration update, routed to the sync job
    RoutedToCacheSync,
}

/// Admission controller
///
/// All dependencies are injected; the controller holds no state between
/// invocations.
pub struct AdmissionController {
    ledger: Arc<AuditLedger>,
    queue: Arc<dyn FileQueue>,
    cache: Arc<dyn PermissionCache>,
    object_store: Arc<dyn ObjectStore>,
    ack: Arc<AckAccumulator>,
    storage: StorageConfig,
}

impl AdmissionController {
    /// Create a new admission controller
    pub fn new(
        ledger: Arc<AuditLedger>,
        queue: Arc<dyn FileQueue>,
        cache: Arc<dyn PermissionCache>,
        object_store: Arc<dyn ObjectStore>,
        ack: Arc<AckAccumulator>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            ledger,
            queue,
            cache,
            object_store,
            ack,
            storage,
        }
    }

    /// Handle an object-arrival notification `{bucket, key}`
    ///
    /// Data-bucket arrivals go through admission; config-bucket arrivals are
    /// routed to the cache sync collaborator (dispatch decision only).
    ///
    /// # Errors
    ///
    /// Infrastructure failures (ledger, queue, cache, storage) propagate to
    /// the invoking event source after a best-effort acknowledgment upload.
    pub async fn handle_arrival(&self, bucket: &str, key: &str) -> Result<ArrivalOutcome> {
        if bucket == self.storage.config_bucket {
            tracing::info!(file_key = %key, "Configuration object received, routing to cache sync");
            return Ok(ArrivalOutcome::RoutedToCacheSync);
        }
        if bucket != self.storage.source_bucket {
            return Err(BatchError::Other(format!(
                "Unexpected bucket name: {bucket}"
            )));
        }

        let created_at = match self.object_store.last_modified(bucket, key).await {
            Ok(when) => format_created_at(when),
            Err(e) => {
                // No received time is available; acknowledge with a placeholder
                self.upload_failure_ack_best_effort(MESSAGE_ID_UNAVAILABLE, key, "created_at_time not identified")
                    .await;
                return Err(e);
            }
        };

        let message_id = MessageId::generate();

        match self.admit(&message_id, key, &created_at).await {
            Ok(queue_name) => {
                tracing::info!(
                    file_key = %key,
                    message_id = %message_id,
                    queue_name = %queue_name,
                    "File successfully admitted"
                );
                Ok(ArrivalOutcome::Admitted {
                    message_id,
                    queue_name,
                })
            }
            Err(AdmissionFailure::Rejected(rejection)) => {
                tracing::warn!(
                    file_key = %key,
                    status_code = rejection.status_code(),
                    "File rejected at admission: {}",
                    rejection
                );
                self.ack
                    .upload_infrastructure_ack(message_id.as_str(), key, false, false, &created_at)
                    .await?;
                Ok(ArrivalOutcome::Rejected(rejection))
            }
            Err(AdmissionFailure::Infrastructure(error)) => {
                tracing::error!(file_key = %key, error = %error, "Error processing file");
                self.upload_failure_ack_best_effort(message_id.as_str(), key, &created_at)
                    .await;
                Err(error)
            }
        }
    }

    /// Completion hand-off for pull-chaining
    ///
    /// Re-enqueues an already-ledgered file using its existing message id and
    /// recorded timestamp; no second audit record is created. Called by row
    /// processing after it marks the previous file for this queue Processed.
    ///
    /// # Errors
    ///
    /// Returns an error if the permission fetch or the enqueue fails.
    pub async fn requeue_existing(&self, record: &AuditRecord) -> Result<()> {
        let file_key = FileKey::parse(&record.filename).map_err(|rejection| {
            // The file was validated at admission, so this indicates ledger
            // corruption rather than a supplier error
            BatchError::Ledger(format!(
                "Ledgered filename {} no longer parses: {}",
                record.filename, rejection
            ))
        })?;

        let permissions = self
            .cache
            .supplier_permissions(file_key.supplier())
            .await?;

        let message = FileQueueMessage {
            message_id: record.message_id.clone(),
            vaccine_type: file_key.vaccine_type(),
            supplier: file_key.supplier().to_string(),
            filename: record.filename.clone(),
            permission: permissions,
            created_at_formatted_string: record.timestamp.clone(),
        };
        self.queue.send(&message).await?;

        tracing::info!(
            file_key = %record.filename,
            message_id = %record.message_id,
            "Next queued file handed off for processing"
        );
        Ok(())
    }

    /// The admission checks proper: key grammar, duplicate name, coarse
    /// vaccine-type permission, then ledger write and enqueue
    async fn admit(
        &self,
        message_id: &MessageId,
        key: &str,
        created_at: &str,
    ) -> std::result::Result<QueueName, AdmissionFailure> {
        let file_key = FileKey::parse(key)?;

        if self.ledger.find_by_filename(key).await?.is_some() {
            return Err(FileRejection::new(
                FileRejectionKind::DuplicateFile,
                format!("Duplicate file: {key} added at {created_at}"),
            )
            .into());
        }

        let permissions = self
            .cache
            .supplier_permissions(file_key.supplier())
            .await?;
        if !has_any_vaccine_permission(file_key.vaccine_type(), &permissions) {
            return Err(FileRejection::new(
                FileRejectionKind::VaccineTypePermission,
                format!(
                    "Initial file validation failed: {} does not have permissions for {}",
                    file_key.supplier(),
                    file_key.vaccine_type()
                ),
            )
            .into());
        }

        let queue_name = file_key.queue_name();
        self.ledger
            .create(message_id.clone(), key, queue_name.clone(), created_at)
            .await?;

        let message = FileQueueMessage {
            message_id: message_id.clone(),
            vaccine_type: file_key.vaccine_type(),
            supplier: file_key.supplier().to_string(),
            filename: key.to_string(),
            permission: permissions,
            created_at_formatted_string: created_at.to_string(),
        };
        self.queue.send(&message).await?;

        Ok(queue_name)
    }

    /// Acknowledgment upload where failure must not mask the primary error
    async fn upload_failure_ack_best_effort(&self, message_id: &str, key: &str, created_at: &str) {
        if let Err(ack_error) = self
            .ack
            .upload_infrastructure_ack(message_id, key, false, false, created_at)
            .await
        {
            tracing::error!(
                file_key = %key,
                error = %ack_error,
                "Failed to upload failure acknowledgment"
            );
        }
    }
}

/// Received-time string format: `YYYYMMDDTHHMMSS00`
fn format_created_at(when: DateTime<Utc>) -> String {
    when.format("%Y%m%dT%H%M%S00").to_string()
}

/// Internal split between supplier-visible rejections and infrastructure
/// failures, which take different acknowledgment and propagation paths
enum AdmissionFailure {
    Rejected(FileRejection),
    Infrastructure(BatchError),
}

impl From<FileRejection> for AdmissionFailure {
    fn from(rejection: FileRejection) -> Self {
        AdmissionFailure::Rejected(rejection)
    }
}

impl From<BatchError> for AdmissionFailure {
    fn from(error: BatchError) -> Self {
        AdmissionFailure::Infrastructure(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MemoryPermissionCache;
    use crate::adapters::ledger::MemoryLedgerStore;
    use crate::adapters::object_store::MemoryObjectStore;
    use crate::adapters::queue::MemoryFileQueue;
    use chrono::TimeZone;

    struct Fixture {
        controller: AdmissionController,
        queue: Arc<MemoryFileQueue>,
        cache: Arc<MemoryPermissionCache>,
        object_store: Arc<MemoryObjectStore>,
        ledger: Arc<AuditLedger>,
    }

    fn fixture() -> Fixture {
        let object_store = Arc::new(MemoryObjectStore::new());
        let queue = Arc::new(MemoryFileQueue::new());
        let cache = Arc::new(MemoryPermissionCache::new());
        let ledger = Arc::new(AuditLedger::new(Arc::new(MemoryLedgerStore::new())));
        let ack = Arc::new(AckAccumulator::new(object_store.clone(), "data-destinations"));
        let controller = AdmissionController::new(
            ledger.clone(),
            queue.clone(),
            cache.clone(),
            object_store.clone(),
            ack,
            StorageConfig::default(),
        );
        Fixture {
            controller,
            queue,
            cache,
            object_store,
            ledger,
        }
    }

    const FILE_KEY: &str = "Flu_Vaccinations_V5_YGM41_20240101T120000.csv";

    async fn seed_file(fixture: &Fixture, key: &str) {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        fixture
            .object_store
            .put_with_timestamp("data-sources", key, "body", when)
            .await;
    }

    #[tokio::test]
    async fn test_valid_file_is_admitted_and_enqueued() {
        let fixture = fixture();
        seed_file(&fixture, FILE_KEY).await;
        fixture.cache.grant("EMIS", &["FLU_FULL"]).await;

        let outcome = fixture
            .controller
            .handle_arrival("data-sources", FILE_KEY)
            .await
            .unwrap();
        let queue_name = match outcome {
            ArrivalOutcome::Admitted { queue_name, .. } => queue_name,
            other => panic!("expected Admitted, got {other:?}"),
        };
        assert_eq!(queue_name.as_str(), "EMIS_FLU");

        let message = fixture
            .queue
            .receive(&queue_name)
            .await
            .unwrap()
            .expect("message should be enqueued");
        assert_eq!(message.filename, FILE_KEY);
        assert_eq!(message.permission, vec!["FLU_FULL"]);
        assert_eq!(message.created_at_formatted_string, "20240101T12000000");

        let record = fixture
            .ledger
            .find_by_filename(FILE_KEY)
            .await
            .unwrap()
            .expect("audit record should exist");
        assert!(!record.is_processed());
    }

    #[tokio::test]
    async fn test_invalid_key_rejected_with_ack_and_no_ledger_entry() {
        let fixture = fixture();
        let bad_key = "Flu_Vaccinations_V5_BADODS_20240101T120000.csv";
        seed_file(&fixture, bad_key).await;

        let outcome = fixture
            .controller
            .handle_arrival("data-sources", bad_key)
            .await
            .unwrap();
        match outcome {
            ArrivalOutcome::Rejected(rejection) => {
                assert_eq!(rejection.kind, FileRejectionKind::InvalidFileKey)
            }
            other => panic!("expected Rejected, got {other:?}"),
        }

        assert!(fixture.ledger.find_by_filename(bad_key).await.unwrap().is_none());
        let ack_keys = fixture.object_store.list_keys("data-destinations").await;
        assert_eq!(ack_keys.len(), 1);
        assert!(ack_keys[0].ends_with("_InfAck.csv"));
    }

    #[tokio::test]
    async fn test_missing_vaccine_permission_rejected() {
        let fixture = fixture();
        seed_file(&fixture, FILE_KEY).await;
        fixture.cache.grant("EMIS", &["RSV_FULL"]).await;

        let outcome = fixture
            .controller
            .handle_arrival("data-sources", FILE_KEY)
            .await
            .unwrap();
        match outcome {
            ArrivalOutcome::Rejected(rejection) => {
                assert_eq!(rejection.kind, FileRejectionKind::VaccineTypePermission)
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resubmitted_filename_rejected_as_duplicate() {
        let fixture = fixture();
        seed_file(&fixture, FILE_KEY).await;
        fixture.cache.grant("EMIS", &["FLU_FULL"]).await;

        fixture
            .controller
            .handle_arrival("data-sources", FILE_KEY)
            .await
            .unwrap();
        let outcome = fixture
            .controller
            .handle_arrival("data-sources", FILE_KEY)
            .await
            .unwrap();
        match outcome {
            ArrivalOutcome::Rejected(rejection) => {
                assert_eq!(rejection.kind, FileRejectionKind::DuplicateFile)
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_config_bucket_routes_to_cache_sync() {
        let fixture = fixture();
        let outcome = fixture
            .controller
            .handle_arrival("config", "permissions_config.json")
            .await
            .unwrap();
        assert_eq!(outcome, ArrivalOutcome::RoutedToCacheSync);
    }

    #[tokio::test]
    async fn test_unexpected_bucket_is_an_error() {
        let fixture = fixture();
        assert!(fixture
            .controller
            .handle_arrival("somewhere-else", FILE_KEY)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_requeue_existing_reuses_message_id() {
        let fixture = fixture();
        fixture.cache.grant("EMIS", &["FLU_FULL"]).await;

        let message_id = MessageId::new("existing-id").unwrap();
        fixture
            .ledger
            .create(
                message_id.clone(),
                FILE_KEY,
                QueueName::new("EMIS", "FLU"),
                "20240101T12000000",
            )
            .await
            .unwrap();

        let record = fixture
            .ledger
            .find_by_filename(FILE_KEY)
            .await
            .unwrap()
            .unwrap();
        fixture.controller.requeue_existing(&record).await.unwrap();

        let message = fixture
            .queue
            .receive(&QueueName::new("EMIS", "FLU"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.message_id, message_id);
        assert_eq!(message.created_at_formatted_string, "20240101T12000000");
    }
}
