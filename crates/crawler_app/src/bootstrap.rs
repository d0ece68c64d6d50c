//! Wires the configured store, queue, and crawl engine together.

use std::sync::Arc;

use crawler_core::queue::{MemoryQueue, RedisQueue};
use crawler_core::store::{MemoryStore, RedisStore};
use crawler_core::{JobStore, QueueError, StoreError, WorkQueue};
use crawler_engine::{CrawlEngine, CrawlSettings, FetchError, FetchSettings, ReqwestFetcher};
use crawler_logging::crawl_info;

use crate::config::AppConfig;

pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn JobStore>, StoreError> {
    match &config.store_redis_url {
        Some(url) => {
            let store = RedisStore::connect(url).await?;
            crawl_info!("connected to redis job store at {url}");
            Ok(Arc::new(store))
        }
        None => {
            crawl_info!("using in-process job store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn connect_queue(config: &AppConfig) -> Result<Arc<dyn WorkQueue>, QueueError> {
    match &config.queue_redis_url {
        Some(url) => {
            let queue = RedisQueue::connect(url, config.workers).await?;
            crawl_info!("connected to redis work queue at {url}");
            Ok(Arc::new(queue))
        }
        None => {
            crawl_info!("using in-process work queue");
            Ok(Arc::new(MemoryQueue::new(config.workers)))
        }
    }
}

pub fn build_engine(
    store: Arc<dyn JobStore>,
    queue: Arc<dyn WorkQueue>,
    config: &AppConfig,
) -> Result<Arc<CrawlEngine>, FetchError> {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default())?);
    let settings = CrawlSettings {
        max_depth: config.max_depth,
    };
    Ok(Arc::new(CrawlEngine::new(store, queue, fetcher, settings)))
}
