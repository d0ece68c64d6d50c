use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::task::JoinHandle;

use crate::{Message, MessageProcessor, QueueError, WorkQueue};
use crawler_logging::crawl_warn;

/// Topic all crawl messages are published under.
const TOPIC: &str = "crawl-url";

/// Consumer group shared by every worker process of a deployment. All
/// subscribers pop from the same list, so each message is delivered to
/// exactly one group member.
const CONSUMER_GROUP: &str = "crawler-workers";

/// Seconds a worker blocks on `BRPOP` before rechecking for shutdown.
const POLL_TIMEOUT_SECS: f64 = 1.0;

/// Clustered work queue backed by a shared Redis list.
///
/// `publish` pushes a JSON-encoded [`Message`]; each subscribed worker pops
/// with `BRPOP` over its own connection, giving load-balanced, at-least-once
/// delivery across every process subscribed under the consumer group.
pub struct RedisQueue {
    client: redis::Client,
    publish_conn: MultiplexedConnection,
    subscribed: AtomicBool,
    stop: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl RedisQueue {
    /// Connects to the Redis node or cluster at `url` and prepares a pool of
    /// `worker_count` consumers for the subscription.
    pub async fn connect(url: &str, worker_count: usize) -> Result<Self, QueueError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let publish_conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self {
            client,
            publish_conn,
            subscribed: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Vec::new()),
            worker_count: worker_count.max(1),
        })
    }
}

#[async_trait]
impl WorkQueue for RedisQueue {
    async fn publish(&self, job_id: &str, url: &str, depth: u32) -> Result<(), QueueError> {
        let message = Message::new(job_id, url, depth);
        let payload = serde_json::to_string(&message)
            .map_err(|err| QueueError::PublishFailed(err.to_string()))?;
        let mut conn = self.publish_conn.clone();
        let _: i64 = conn
            .lpush(queue_key(), payload)
            .await
            .map_err(|err| QueueError::PublishFailed(err.to_string()))?;
        Ok(())
    }

    async fn subscribe(&self, processor: Arc<dyn MessageProcessor>) -> Result<(), QueueError> {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(QueueError::AlreadySubscribed);
        }

        let mut handles = Vec::with_capacity(self.worker_count);
        for _ in 0..self.worker_count {
            // BRPOP blocks its connection, so every worker gets its own.
            let mut conn = self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(unavailable)?;
            let processor = Arc::clone(&processor);
            let stop = Arc::clone(&self.stop);
            handles.push(tokio::spawn(async move {
                loop {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    let popped: Result<Option<(String, String)>, _> =
                        conn.brpop(queue_key(), POLL_TIMEOUT_SECS).await;
                    match popped {
                        Ok(Some((_, payload))) => match serde_json::from_str::<Message>(&payload) {
                            Ok(message) => processor.process(message).await,
                            Err(err) => {
                                crawl_warn!("dropping undecodable queue payload: {err}");
                            }
                        },
                        Ok(None) => {}
                        Err(err) => {
                            crawl_warn!("queue poll failed: {err}");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }));
        }

        self.workers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(handles);
        Ok(())
    }

    async fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
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

fn queue_key() -> String {
    format!("crawl:queue:{TOPIC}:{CONSUMER_GROUP}")
}

fn unavailable(err: redis::RedisError) -> QueueError {
    QueueError::Unavailable(err.to_string())
}
