use serde::{Deserialize, Serialize};

/// One unit of crawl work flowing through the work queue.
///
/// Messages are immutable: the submission path creates them at depth 0 and
/// the crawl engine creates them at `depth + 1` when following a link. The
/// serialized form is the wire format of the clustered queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier of the job that triggered this message.
    pub job_id: String,
    /// URL to crawl.
    pub url: String,
    /// Link-following hops from the seed URL (0 = seed).
    pub depth: u32,
}

impl Message {
    pub fn new(job_id: impl Into<String>, url: impl Into<String>, depth: u32) -> Self {
        Self {
            job_id: job_id.into(),
            url: url.into(),
            depth,
        }
    }
}
