//! File-level row processing
//!
//! Consumes one queued file per invocation: fetches the body, re-validates
//! it (headers, then operation permissions), transforms each data row and
//! dispatches exactly one outbound message per row. Whatever happens, the
//! file's audit record reaches Processed and the next queued file for the
//! same queue name is handed back to admission control; this pull-chaining
//! is what serializes files within a queue name.

use crate::adapters::object_store::ObjectStore;
use crate::config::StorageConfig;
use crate::core::ack::AckAccumulator;
use crate::core::admission::AdmissionController;
use crate::core::ledger::AuditLedger;
use crate::core::transform::headers::CsvBody;
use crate::core::transform::row::process_row;
use crate::domain::{
    permitted_operations, FileQueueMessage, FileRejection, Operation, QueueName, Result,
    RowDispatch, RowId,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Sink for outbound row messages
///
/// The forwarding stage consumes these; tests substitute a recorder.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Accept one dispatched row message
    async fn dispatch(&self, dispatch: RowDispatch) -> Result<()>;
}

/// Summary of one file invocation
#[derive(Debug, Clone)]
pub struct FileProcessingSummary {
    /// Rows dispatched downstream (zero when the file was rejected)
    pub rows_dispatched: usize,
    /// The file-level rejection, when the whole file was refused
    pub rejection: Option<FileRejection>,
}

/// Row transform and dispatch stage
pub struct RowProcessor {
    object_store: Arc<dyn ObjectStore>,
    ledger: Arc<AuditLedger>,
    ack: Arc<AckAccumulator>,
    admission: Arc<AdmissionController>,
    sink: Arc<dyn RowSink>,
    storage: StorageConfig,
}

impl RowProcessor {
    /// Create a new row processor
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        ledger: Arc<AuditLedger>,
        ack: Arc<AckAccumulator>,
        admission: Arc<AdmissionController>,
        sink: Arc<dyn RowSink>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            object_store,
            ledger,
            ack,
            admission,
            sink,
            storage,
        }
    }

    /// Process one queued file end to end
    ///
    /// # Errors
    ///
    /// Infrastructure failures propagate without advancing the queue: the
    /// audit record stays Queued and recovery requires an external re-drive.
    pub async fn process_file(&self, message: &FileQueueMessage) -> Result<FileProcessingSummary> {
        tracing::info!(
            file_key = %message.filename,
            message_id = %message.message_id,
            "Row processing started"
        );

        let content = self
            .object_store
            .get(&self.storage.source_bucket, &message.filename)
            .await?;

        let (body, allowed_operations) = match self.validate_file(message, &content) {
            Ok(validated) => validated,
            Err(rejection) => {
                self.handle_file_rejection(message, &rejection).await?;
                return Ok(FileProcessingSummary {
                    rows_dispatched: 0,
                    rejection: Some(rejection),
                });
            }
        };

        // File-level validation passed: acknowledge, then move the source
        // object out of the inbox while its rows are processed
        self.ack
            .upload_infrastructure_ack(
                message.message_id.as_str(),
                &message.filename,
                true,
                true,
                &message.created_at_formatted_string,
            )
            .await?;
        self.object_store
            .move_object(
                &self.storage.source_bucket,
                &message.filename,
                &format!("processing/{}", message.filename),
            )
            .await?;

        let mut rows_dispatched = 0;
        for (index, row) in body.rows().enumerate() {
            let row_number = index + 1;
            let row_id = RowId::new(&message.message_id, row_number);
            let processed = process_row(message.vaccine_type, &allowed_operations, &row);

            let dispatch = RowDispatch {
                row_id,
                file_key: message.filename.clone(),
                supplier: message.supplier.clone(),
                vaccine_type: message.vaccine_type,
                created_at_formatted_string: message.created_at_formatted_string.clone(),
                local_id: processed.local_id,
                operation_requested: processed.operation_requested,
                payload: processed.payload,
            };
            self.sink.dispatch(dispatch).await?;
            rows_dispatched += 1;
        }

        tracing::info!(
            file_key = %message.filename,
            total_rows = rows_dispatched,
            "Row processing completed"
        );

        self.finish_and_chain(message).await?;
        Ok(FileProcessingSummary {
            rows_dispatched,
            rejection: None,
        })
    }

    /// Header check then operation-permission check
    fn validate_file(
        &self,
        message: &FileQueueMessage,
        content: &str,
    ) -> std::result::Result<(CsvBody, HashSet<Operation>), FileRejection> {
        let body = CsvBody::parse(content)?;

        let requested: HashSet<Operation> = body
            .rows()
            .filter_map(|row| Operation::from_action_flag(row.raw("ACTION_FLAG")))
            .collect();

        let allowed = permitted_operations(
            &message.supplier,
            message.vaccine_type,
            &message.permission,
            &requested,
        )?;

        tracing::info!(
            supplier = %message.supplier,
            vaccine_type = %message.vaccine_type,
            allowed = ?allowed,
            "Operation permissions validated"
        );
        Ok((body, allowed))
    }

    /// Failure acknowledgment, archive, then advance the queue
    ///
    /// No rows are processed for a rejected file, but the queue must still
    /// move on to the next file.
    async fn handle_file_rejection(
        &self,
        message: &FileQueueMessage,
        rejection: &FileRejection,
    ) -> Result<()> {
        tracing::warn!(
            file_key = %message.filename,
            status_code = rejection.status_code(),
            "File rejected during row processing: {rejection}"
        );

        self.ack
            .upload_infrastructure_ack(
                message.message_id.as_str(),
                &message.filename,
                false,
                false,
                &message.created_at_formatted_string,
            )
            .await?;

        // Archiving is a side-channel: its failure must not stop the queue
        if let Err(move_error) = self
            .object_store
            .move_object(
                &self.storage.source_bucket,
                &message.filename,
                &format!("archive/{}", message.filename),
            )
            .await
        {
            tracing::error!(
                file_key = %message.filename,
                error = %move_error,
                "Failed to move rejected file to archive"
            );
        }

        self.finish_and_chain(message).await
    }

    /// Mark the file Processed, then hand the oldest remaining queued file
    /// for this queue name back to admission control
    async fn finish_and_chain(&self, message: &FileQueueMessage) -> Result<()> {
        self.ledger.mark_processed(&message.message_id).await?;

        let queue_name = message.queue_name();
        self.chain_to_next(&queue_name).await
    }

    /// Pull-chaining step: dispatch the next queued file, if any
    async fn chain_to_next(&self, queue_name: &QueueName) -> Result<()> {
        match self.ledger.find_oldest_queued(queue_name).await? {
            Some(next) => {
                tracing::info!(
                    queue_name = %queue_name,
                    next_file = %next.filename,
                    "Chaining to next queued file"
                );
                self.admission.requeue_existing(&next).await
            }
            None => {
                tracing::debug!(queue_name = %queue_name, "No further files queued");
                Ok(())
            }
        }
    }
}
