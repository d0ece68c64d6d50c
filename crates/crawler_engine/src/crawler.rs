use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crawler_core::{JobStore, Message, MessageProcessor, WorkQueue};
use crawler_logging::{crawl_debug, crawl_info, crawl_warn};

use crate::fetch::{FetchError, PageFetcher};
use crate::scan::{scan_document, PageItem};

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Maximum link-following hops from a seed. A message at this depth may
    /// still record images, but never enqueues further links. The depth bound
    /// caps total work; termination on cyclic sites is already guaranteed by
    /// the visit gate.
    pub max_depth: u32,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        // One hop from the seed page.
        Self { max_depth: 1 }
    }
}

/// Processes one crawl message at a time: gate on the visit dedup check,
/// fetch the page, record images, republish links within the depth bound.
///
/// The engine holds no state between messages, which is what allows running
/// arbitrarily many workers against the same store and queue.
pub struct CrawlEngine {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn WorkQueue>,
    fetcher: Arc<dyn PageFetcher>,
    settings: CrawlSettings,
}

impl CrawlEngine {
    pub fn new(
        store: Arc<dyn JobStore>,
        queue: Arc<dyn WorkQueue>,
        fetcher: Arc<dyn PageFetcher>,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            store,
            queue,
            fetcher,
            settings,
        }
    }

    async fn crawl(&self, message: &Message) -> Result<(), FetchError> {
        let url = Url::parse(&message.url)
            .map_err(|err| FetchError::InvalidUrl(format!("{}: {err}", message.url)))?;
        let page = self.fetcher.fetch(&url).await?;

        for item in scan_document(&page.html, &page.final_url) {
            match item {
                PageItem::Image { url } => {
                    if let Err(err) = self.store.record_image(&message.job_id, url.as_str()).await
                    {
                        crawl_warn!(
                            "recording image failed job={} image={url}: {err}",
                            message.job_id
                        );
                    }
                }
                PageItem::Link { url } => {
                    if message.depth >= self.settings.max_depth {
                        continue;
                    }
                    if let Err(err) = self
                        .queue
                        .publish(&message.job_id, url.as_str(), message.depth + 1)
                        .await
                    {
                        // The link is simply never followed.
                        crawl_warn!(
                            "publishing link failed job={} url={url}: {err}",
                            message.job_id
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl MessageProcessor for CrawlEngine {
    async fn process(&self, message: Message) {
        crawl_debug!(
            "message received job={} url={} depth={}",
            message.job_id,
            message.url,
            message.depth
        );

        match self.store.visit_page(&message.job_id, &message.url).await {
            Ok(true) => {}
            Ok(false) => {
                crawl_debug!(
                    "page already visited job={} url={}",
                    message.job_id,
                    message.url
                );
                return;
            }
            Err(err) => {
                crawl_warn!(
                    "visit gate failed job={} url={}: {err}",
                    message.job_id,
                    message.url
                );
                return;
            }
        }

        if let Err(err) = self.store.mark_processing(&message.job_id).await {
            crawl_warn!("marking processing failed job={}: {err}", message.job_id);
        }

        crawl_info!("crawling job={} url={}", message.job_id, message.url);

        // Fetch and extraction failures are dead ends, not retries; the done
        // counter must advance no matter how the crawl went.
        if let Err(err) = self.crawl(&message).await {
            crawl_warn!(
                "crawl failed job={} url={}: {err}",
                message.job_id,
                message.url
            );
        }

        if let Err(err) = self.store.mark_done(&message.job_id).await {
            crawl_warn!("marking done failed job={}: {err}", message.job_id);
        }
    }
}
