//! Pipeline coordinator
//!
//! Wires the stages together: admission control → file queue → row
//! processing → forwarding → acknowledgment accumulation. Each stage is
//! stateless per invocation and owns only injected service handles, so
//! files on different queue names could run through independent coordinator
//! instances with no coordination; within a queue name, ordering comes from
//! the ledger's pull-chaining, not from any lock held here.

use crate::adapters::cache::PermissionCache;
use crate::adapters::factory::{create_object_store, create_permission_cache};
use crate::adapters::ledger::MemoryLedgerStore;
use crate::adapters::object_store::ObjectStore;
use crate::adapters::queue::{FileQueue, MemoryFileQueue};
use crate::adapters::store::MemoryRecordStore;
use crate::config::VaxbatchConfig;
use crate::core::ack::AckAccumulator;
use crate::core::admission::{AdmissionController, ArrivalOutcome};
use crate::core::forward::RowForwarder;
use crate::core::ledger::{AuditLedger, AuditRecord};
use crate::core::transform::processor::{RowProcessor, RowSink};
use crate::domain::{FileQueueMessage, QueueName, Result, RowDispatch};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Buffers dispatched rows into transport-sized batches and delivers each
/// batch through forwarding into the acknowledgment report
struct BatchingSink {
    forwarder: Arc<RowForwarder>,
    ack: Arc<AckAccumulator>,
    batch_size: usize,
    buffer: Mutex<Vec<RowDispatch>>,
}

impl BatchingSink {
    fn new(forwarder: Arc<RowForwarder>, ack: Arc<AckAccumulator>, batch_size: usize) -> Self {
        Self {
            forwarder,
            ack,
            batch_size,
            buffer: Mutex::new(Vec::new()),
        }
    }

    async fn deliver(&self, batch: Vec<RowDispatch>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let outcomes = self.forwarder.forward_batch(&batch).await;
        self.ack.append_outcomes(&outcomes).await
    }

    /// Deliver whatever is buffered, ending the current file's batching
    async fn flush(&self) -> Result<()> {
        let batch = std::mem::take(&mut *self.buffer.lock().await);
        self.deliver(batch).await
    }
}

#[async_trait]
impl RowSink for BatchingSink {
    async fn dispatch(&self, dispatch: RowDispatch) -> Result<()> {
        let full_batch = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(dispatch);
            if buffer.len() >= self.batch_size {
                Some(std::mem::take(&mut *buffer))
            } else {
                None
            }
        };
        if let Some(batch) = full_batch {
            self.deliver(batch).await?;
        }
        Ok(())
    }
}

/// The assembled batch pipeline
pub struct Pipeline {
    admission: Arc<AdmissionController>,
    processor: RowProcessor,
    queue: Arc<MemoryFileQueue>,
    ledger: Arc<AuditLedger>,
    sink: Arc<BatchingSink>,
}

impl Pipeline {
    /// Build the pipeline with backends selected by configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configured backend cannot be constructed.
    pub fn new(config: &VaxbatchConfig) -> Result<Self> {
        let object_store = create_object_store(config)?;
        let cache = create_permission_cache(config, &object_store)?;
        Ok(Self::from_parts(config, object_store, cache))
    }

    /// Build the pipeline from externally constructed storage and cache
    ///
    /// Tests use this to seed the memory backends directly.
    pub fn from_parts(
        config: &VaxbatchConfig,
        object_store: Arc<dyn ObjectStore>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        let queue = Arc::new(MemoryFileQueue::new());
        let ledger = Arc::new(AuditLedger::new(Arc::new(MemoryLedgerStore::new())));
        let record_store = Arc::new(MemoryRecordStore::new());
        let ack = Arc::new(AckAccumulator::new(
            object_store.clone(),
            config.storage.ack_bucket.clone(),
        ));

        let admission = Arc::new(AdmissionController::new(
            ledger.clone(),
            queue.clone(),
            cache,
            object_store.clone(),
            ack.clone(),
            config.storage.clone(),
        ));

        let forwarder = Arc::new(RowForwarder::new(record_store));
        let sink = Arc::new(BatchingSink::new(
            forwarder,
            ack.clone(),
            config.forwarding.batch_size,
        ));

        let processor = RowProcessor::new(
            object_store,
            ledger.clone(),
            ack,
            admission.clone(),
            sink.clone(),
            config.storage.clone(),
        );

        Self {
            admission,
            processor,
            queue,
            ledger,
            sink,
        }
    }

    /// Handle one object-arrival event end to end
    ///
    /// Runs admission and, when the file is admitted, drains its queue:
    /// the admitted file and everything pull-chaining hands back afterwards.
    ///
    /// # Errors
    ///
    /// Propagates infrastructure failures from any stage.
    pub async fn handle_arrival(&self, bucket: &str, key: &str) -> Result<ArrivalOutcome> {
        let outcome = self.admission.handle_arrival(bucket, key).await?;

        if let ArrivalOutcome::Admitted { queue_name, .. } = &outcome {
            self.drain_queue(queue_name).await?;
        }
        Ok(outcome)
    }

    /// Process queued files for a queue name until it is empty
    ///
    /// Pull-chaining enqueues the next file as each one completes, so this
    /// loop observes files strictly in ledger timestamp order. A message for
    /// an already-Processed file (a tolerated chaining race) is skipped.
    pub async fn drain_queue(&self, queue_name: &QueueName) -> Result<()> {
        while let Some(message) = self.queue.receive(queue_name).await? {
            if self.already_processed(&message).await? {
                tracing::info!(
                    file_key = %message.filename,
                    "File already processed, skipping duplicate dispatch"
                );
                continue;
            }
            self.processor.process_file(&message).await?;
            // One file's rows are complete; deliver the remainder batch
            self.sink.flush().await?;
        }
        Ok(())
    }

    async fn already_processed(&self, message: &FileQueueMessage) -> Result<bool> {
        Ok(self
            .ledger
            .find_by_filename(&message.filename)
            .await?
            .map(|record| record.is_processed())
            .unwrap_or(false))
    }

    /// The admission controller, for callers that admit without draining
    /// (e.g. bulk backfills that enqueue many files before processing)
    pub fn admission(&self) -> Arc<AdmissionController> {
        self.admission.clone()
    }

    /// All audit ledger records, oldest first
    pub async fn ledger_records(&self) -> Result<Vec<AuditRecord>> {
        self.ledger.all_records().await
    }
}
