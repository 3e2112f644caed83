//! In-memory FIFO file queue
//!
//! One `VecDeque` per queue name behind a single async lock. FIFO within a
//! queue name, no ordering across queue names.

use crate::adapters::queue::traits::FileQueue;
use crate::domain::{FileQueueMessage, QueueName, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// File queue held entirely in process memory
#[derive(Default)]
pub struct MemoryFileQueue {
    queues: Mutex<HashMap<String, VecDeque<FileQueueMessage>>>,
}

impl MemoryFileQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages currently waiting for a queue name
    pub async fn depth(&self, queue_name: &QueueName) -> usize {
        self.queues
            .lock()
            .await
            .get(queue_name.as_str())
            .map(|q| q.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl FileQueue for MemoryFileQueue {
    async fn send(&self, message: &FileQueueMessage) -> Result<()> {
        let queue_name = message.queue_name();
        self.queues
            .lock()
            .await
            .entry(queue_name.as_str().to_string())
            .or_default()
            .push_back(message.clone());
        tracing::debug!(
            queue_name = %queue_name,
            message_id = %message.message_id,
            "Message enqueued"
        );
        Ok(())
    }

    async fn receive(&self, queue_name: &QueueName) -> Result<Option<FileQueueMessage>> {
        Ok(self
            .queues
            .lock()
            .await
            .get_mut(queue_name.as_str())
            .and_then(|q| q.pop_front()))
    }
}
