use thiserror::Error;

/// Failures surfaced by a job store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The job id was never created or observed by this store.
    #[error("job not found: {0}")]
    NotFound(String),
    /// The backend could not be reached. Fatal to the attempted operation,
    /// not to the process.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced by a work queue backend.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The backend rejected or could not accept a publish.
    #[error("publish failed: {0}")]
    PublishFailed(String),
    /// `subscribe` was called on a queue that already has a processor.
    #[error("a message processor is already subscribed")]
    AlreadySubscribed,
    /// The backend could not be reached.
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}
