//! Work queue contract and backends.
mod memory;
mod redis;

pub use memory::MemoryQueue;
pub use redis::RedisQueue;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Message, QueueError};

/// Callback invoked once per delivered message, potentially many times
/// concurrently. Implementations swallow their own failures; a message that
/// cannot be processed is logged and dropped, never retried by the processor.
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn process(&self, message: Message);
}

/// Publish/subscribe contract for crawl work distribution.
///
/// Delivery is at-least-once: a published message may reach the processing
/// side more than once, and consumers stay correct through the job store's
/// dedup gate. Exactly one processor may be registered per queue instance.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Enqueues a message. Succeeds as long as the backend is reachable.
    async fn publish(&self, job_id: &str, url: &str, depth: u32) -> Result<(), QueueError>;

    /// Registers the single message processor and starts the worker pool that
    /// pulls deliveries. A second call fails with
    /// [`QueueError::AlreadySubscribed`].
    async fn subscribe(&self, processor: Arc<dyn MessageProcessor>) -> Result<(), QueueError>;

    /// Stops accepting new messages, drains queued and in-flight deliveries,
    /// and joins the worker pool.
    async fn shutdown(&self);
}
