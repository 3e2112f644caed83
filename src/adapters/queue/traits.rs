//! File queue abstraction
//!
//! Admitted files travel to row processing as [`FileQueueMessage`]s on a
//! queue partitioned by queue name (`{supplier}_{vaccine_type}`). Ordering is
//! FIFO within a queue name; across queue names there is no ordering at all.

use crate::domain::{FileQueueMessage, QueueName, Result};
use async_trait::async_trait;

/// File queue client trait
#[async_trait]
pub trait FileQueue: Send + Sync {
    /// Enqueue a message onto its queue-name partition
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be enqueued; admission treats
    /// this as an infrastructure failure of the whole file.
    async fn send(&self, message: &FileQueueMessage) -> Result<()>;

    /// Dequeue the next message for a queue name, if any
    async fn receive(&self, queue_name: &QueueName) -> Result<Option<FileQueueMessage>>;
}
