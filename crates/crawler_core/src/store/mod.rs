//! Job store contract and backends.
mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;

use crate::{JobStatus, StoreError};

/// Storage contract for per-job crawl state.
///
/// Every operation must be safe to call from unboundedly many concurrent
/// workers. Mutations are per-field atomic increments; the store never
/// promises cross-field transactional consistency.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Idempotent initialization hook, called once at job submission.
    ///
    /// Backends that need no setup may treat this as a registration-only
    /// operation, but after it returns `status` and `results` must know the
    /// job id.
    async fn create_job(&self, job_id: &str) -> Result<(), StoreError>;

    /// Atomically increments the count of URLs currently being fetched.
    async fn mark_processing(&self, job_id: &str) -> Result<(), StoreError>;

    /// Atomically increments the done count and decrements the processing
    /// count, as two independent atomic operations. A concurrent status read
    /// may observe the intermediate state.
    async fn mark_done(&self, job_id: &str) -> Result<(), StoreError>;

    /// Adds an image URL to the job's result set. Re-adding a present URL is
    /// a no-op.
    async fn record_image(&self, job_id: &str, url: &str) -> Result<(), StoreError>;

    /// The dedup gate. Returns `true` the first time a (job, url) pair is
    /// seen and `false` on every later call, always incrementing the stored
    /// hit counter. Atomic per (job, url): under concurrent callers exactly
    /// one observes `true`.
    async fn visit_page(&self, job_id: &str, url: &str) -> Result<bool, StoreError>;

    /// Current counters and page-view projection for a job.
    async fn status(&self, job_id: &str) -> Result<JobStatus, StoreError>;

    /// The accumulated image URL set for a job.
    async fn results(&self, job_id: &str) -> Result<Vec<String>, StoreError>;
}
