use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::{JobStatus, JobStore, PageView, StoreError};

/// Registry set holding every job id that has been created.
const JOBS_KEY: &str = "crawl:jobs";

/// Clustered job store backed by Redis.
///
/// Each job field maps onto one Redis structure: plain counters for the
/// processing/done counts, a set for the image results, and a hash of
/// per-URL hit counters for the page views. All mutations are single
/// server-side atomic commands, so concurrent workers never race through
/// read-modify-write cycles.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connects to the Redis node or cluster at `url`
    /// (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self { conn })
    }

    async fn created(&self, job_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        conn.sismember(JOBS_KEY, job_id).await.map_err(unavailable)
    }
}

#[async_trait]
impl JobStore for RedisStore {
    async fn create_job(&self, job_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.sadd(JOBS_KEY, job_id).await.map_err(unavailable)?;
        Ok(())
    }

    async fn mark_processing(&self, job_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .incr(processing_key(job_id), 1i64)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn mark_done(&self, job_id: &str) -> Result<(), StoreError> {
        // Two independent atomic commands; a concurrent status read may see
        // the done increment before the processing decrement.
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .incr(done_key(job_id), 1i64)
            .await
            .map_err(unavailable)?;
        let _: i64 = conn
            .decr(processing_key(job_id), 1i64)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn record_image(&self, job_id: &str, url: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .sadd(images_key(job_id), url)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn visit_page(&self, job_id: &str, url: &str) -> Result<bool, StoreError> {
        // HINCRBY returns the post-increment value, so the first visitor of a
        // (job, url) pair sees 1 and every later caller sees more.
        let mut conn = self.conn.clone();
        let hits: i64 = conn
            .hincr(page_views_key(job_id), url, 1i64)
            .await
            .map_err(unavailable)?;
        Ok(hits == 1)
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, StoreError> {
        if !self.created(job_id).await? {
            return Err(StoreError::NotFound(job_id.to_string()));
        }

        let mut conn = self.conn.clone();
        let processing: Option<i64> = conn
            .get(processing_key(job_id))
            .await
            .map_err(unavailable)?;
        let done: Option<i64> = conn.get(done_key(job_id)).await.map_err(unavailable)?;
        let views: HashMap<String, i64> = conn
            .hgetall(page_views_key(job_id))
            .await
            .map_err(unavailable)?;

        let page_views = views
            .into_iter()
            .map(|(url, hits)| PageView { url, hits })
            .collect();

        Ok(JobStatus::new(
            processing.unwrap_or(0),
            done.unwrap_or(0),
            page_views,
        ))
    }

    async fn results(&self, job_id: &str) -> Result<Vec<String>, StoreError> {
        if !self.created(job_id).await? {
            return Err(StoreError::NotFound(job_id.to_string()));
        }

        let mut conn = self.conn.clone();
        conn.smembers(images_key(job_id)).await.map_err(unavailable)
    }
}

fn processing_key(job_id: &str) -> String {
    format!("crawl:job:{job_id}:processing")
}

fn done_key(job_id: &str) -> String {
    format!("crawl:job:{job_id}:done")
}

fn images_key(job_id: &str) -> String {
    format!("crawl:job:{job_id}:images")
}

fn page_views_key(job_id: &str) -> String {
    format!("crawl:job:{job_id}:pageviews")
}

fn unavailable(err: redis::RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}
