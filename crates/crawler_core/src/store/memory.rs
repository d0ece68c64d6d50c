use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{JobStatus, JobStore, PageView, StoreError};

/// Image URL set that suppresses duplicates while keeping insertion order.
#[derive(Debug, Default)]
struct ImageSet {
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl ImageSet {
    fn add(&mut self, url: &str) {
        if self.seen.insert(url.to_string()) {
            self.urls.push(url.to_string());
        }
    }
}

#[derive(Debug, Default)]
struct JobRecord {
    processing: i64,
    done: i64,
    images: ImageSet,
    page_views: HashMap<String, i64>,
}

/// In-process job store backed by a mutex-guarded map.
///
/// Suitable for single-node deployments and tests. All state is owned by the
/// instance; nothing outlives a dropped store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    jobs: Mutex<HashMap<String, JobRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_job<T>(&self, job_id: &str, f: impl FnOnce(&mut JobRecord) -> T) -> T {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        f(jobs.entry(job_id.to_string()).or_default())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, job_id: &str) -> Result<(), StoreError> {
        self.with_job(job_id, |_| ());
        Ok(())
    }

    async fn mark_processing(&self, job_id: &str) -> Result<(), StoreError> {
        self.with_job(job_id, |job| job.processing += 1);
        Ok(())
    }

    async fn mark_done(&self, job_id: &str) -> Result<(), StoreError> {
        self.with_job(job_id, |job| {
            job.done += 1;
            job.processing -= 1;
        });
        Ok(())
    }

    async fn record_image(&self, job_id: &str, url: &str) -> Result<(), StoreError> {
        self.with_job(job_id, |job| job.images.add(url));
        Ok(())
    }

    async fn visit_page(&self, job_id: &str, url: &str) -> Result<bool, StoreError> {
        Ok(self.with_job(job_id, |job| {
            let hits = job.page_views.entry(url.to_string()).or_insert(0);
            *hits += 1;
            *hits == 1
        }))
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, StoreError> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let job = jobs
            .get(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;

        let page_views = job
            .page_views
            .iter()
            .map(|(url, hits)| PageView {
                url: url.clone(),
                hits: *hits,
            })
            .collect();

        Ok(JobStatus::new(job.processing, job.done, page_views))
    }

    async fn results(&self, job_id: &str) -> Result<Vec<String>, StoreError> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let job = jobs
            .get(job_id)
            .ok_or_else(|| StoreError::NotFound(job_id.to_string()))?;
        Ok(job.images.urls.clone())
    }
}
