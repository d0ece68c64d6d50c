//! Crawler core: shared value types plus the job store and work queue
//! contracts with their in-process and Redis-backed implementations.
mod error;
mod job;
mod message;
pub mod queue;
pub mod store;

pub use error::{QueueError, StoreError};
pub use job::{JobStatus, PageView};
pub use message::Message;
pub use queue::{MessageProcessor, WorkQueue};
pub use store::JobStore;
