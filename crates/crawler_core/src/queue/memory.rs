use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::{Message, MessageProcessor, QueueError, WorkQueue};
use crawler_logging::crawl_debug;

/// In-process work queue backed by an unbounded channel and a bounded pool
/// of worker tasks.
///
/// Messages are not persisted; anything still queued when the process exits
/// is lost. Each message is delivered to exactly one worker. Concurrency is
/// capped at the pool size, with queue depth providing backpressure on total
/// outstanding work.
pub struct MemoryQueue {
    tx: Mutex<Option<UnboundedSender<Message>>>,
    rx: Mutex<Option<UnboundedReceiver<Message>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl MemoryQueue {
    /// Creates a queue whose subscription will run `worker_count` concurrent
    /// worker tasks.
    pub fn new(worker_count: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            workers: Mutex::new(Vec::new()),
            worker_count: worker_count.max(1),
        }
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn publish(&self, job_id: &str, url: &str, depth: u32) -> Result<(), QueueError> {
        let tx = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        match tx.as_ref() {
            Some(tx) => tx
                .send(Message::new(job_id, url, depth))
                .map_err(|_| QueueError::PublishFailed("channel closed".into())),
            None => Err(QueueError::PublishFailed("queue is shut down".into())),
        }
    }

    async fn subscribe(&self, processor: Arc<dyn MessageProcessor>) -> Result<(), QueueError> {
        let rx = self
            .rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(QueueError::AlreadySubscribed)?;

        // The pool shares one receiver; whichever idle worker grabs the lock
        // first takes the next message, releasing it before processing.
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let mut handles = Vec::with_capacity(self.worker_count);
        for worker in 0..self.worker_count {
            let rx = Arc::clone(&rx);
            let processor = Arc::clone(&processor);
            handles.push(tokio::spawn(async move {
                loop {
                    let message = { rx.lock().await.recv().await };
                    match message {
                        Some(message) => processor.process(message).await,
                        None => break,
                    }
                }
                crawl_debug!("memory queue worker {worker} stopped");
            }));
        }

        self.workers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(handles);
        Ok(())
    }

    async fn shutdown(&self) {
        // Dropping the sender closes the channel; workers drain what is left
        // and exit when recv returns None.
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}
