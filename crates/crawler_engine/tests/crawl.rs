use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crawler_core::queue::MemoryQueue;
use crawler_core::store::MemoryStore;
use crawler_core::{JobStore, WorkQueue};
use crawler_engine::{
    CrawlEngine, CrawlSettings, FetchError, FetchSettings, FetchedPage, PageFetcher,
    ReqwestFetcher,
};

/// Serves canned HTML keyed by URL; any other URL is a network dead end.
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
}

impl StubFetcher {
    fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(FetchedPage {
                final_url: url.clone(),
                html: html.clone(),
            }),
            None => Err(FetchError::Network("unreachable".into())),
        }
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    queue: Arc<MemoryQueue>,
}

impl Harness {
    async fn start(fetcher: Arc<dyn PageFetcher>, settings: CrawlSettings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new(4));
        let engine = Arc::new(CrawlEngine::new(
            store.clone(),
            queue.clone(),
            fetcher,
            settings,
        ));
        queue.subscribe(engine).await.unwrap();
        store.create_job("job").await.unwrap();
        Self { store, queue }
    }

    async fn wait_until_done(&self, expected_done: i64) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        loop {
            let status = self.store.status("job").await.unwrap();
            if status.done >= expected_done && status.processing == 0 {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out: done={} processing={}",
                status.done,
                status.processing
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[tokio::test]
async fn seed_page_images_are_recorded_and_link_is_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body>
                <img src="/img/one.png">
                <img src="/img/two.png">
                <a href="/next">next</a>
            </body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html><body>done</body></html>", "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap());
    let harness = Harness::start(fetcher, CrawlSettings::default()).await;

    let seed = format!("{}/", server.uri());
    harness.queue.publish("job", &seed, 0).await.unwrap();
    harness.wait_until_done(2).await;

    let status = harness.store.status("job").await.unwrap();
    assert_eq!(status.done, 2);
    assert_eq!(status.processing, 0);
    assert_eq!(status.page_views().len(), 2);

    let mut results = harness.store.results("job").await.unwrap();
    results.sort();
    assert_eq!(
        results,
        vec![
            format!("{}/img/one.png", server.uri()),
            format!("{}/img/two.png", server.uri()),
        ]
    );

    harness.queue.shutdown().await;
}

#[tokio::test]
async fn depth_bound_stops_link_following_but_not_image_recording() {
    let fetcher = Arc::new(StubFetcher::default().with_page(
        "http://site.example/deep",
        r#"<img src="pic.jpg"><a href="further">go</a>"#,
    ));
    let harness = Harness::start(fetcher, CrawlSettings { max_depth: 1 }).await;

    // Already at the depth bound: images recorded, links never enqueued.
    harness
        .queue
        .publish("job", "http://site.example/deep", 1)
        .await
        .unwrap();
    harness.wait_until_done(1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let status = harness.store.status("job").await.unwrap();
    assert_eq!(status.done, 1);
    assert_eq!(status.page_views().len(), 1);
    assert_eq!(
        harness.store.results("job").await.unwrap(),
        vec!["http://site.example/pic.jpg".to_string()]
    );

    harness.queue.shutdown().await;
}

#[tokio::test]
async fn duplicate_deliveries_are_gated_after_the_first() {
    let fetcher = Arc::new(
        StubFetcher::default().with_page("http://site.example/", "<html><body>hi</body></html>"),
    );
    let harness = Harness::start(fetcher, CrawlSettings::default()).await;

    harness
        .queue
        .publish("job", "http://site.example/", 0)
        .await
        .unwrap();
    harness
        .queue
        .publish("job", "http://site.example/", 0)
        .await
        .unwrap();

    harness.wait_until_done(1).await;
    harness.queue.shutdown().await;

    let status = harness.store.status("job").await.unwrap();
    assert_eq!(status.done, 1);
    assert_eq!(status.processing, 0);
    // The gate still counts every sighting.
    assert_eq!(status.page_views()[0].hits, 2);
}

#[tokio::test]
async fn fetch_failure_is_a_dead_end_but_still_finishes() {
    let fetcher = Arc::new(StubFetcher::default());
    let harness = Harness::start(fetcher, CrawlSettings::default()).await;

    harness
        .queue
        .publish("job", "http://unreachable.example/", 0)
        .await
        .unwrap();
    harness.wait_until_done(1).await;

    let status = harness.store.status("job").await.unwrap();
    assert_eq!(status.done, 1);
    assert_eq!(status.processing, 0);
    assert!(harness.store.results("job").await.unwrap().is_empty());

    harness.queue.shutdown().await;
}

#[tokio::test]
async fn multiple_seeds_round_trip_counters() {
    let fetcher = Arc::new(
        StubFetcher::default()
            .with_page("http://a.example/", "<p>a</p>")
            .with_page("http://b.example/", "<p>b</p>")
            .with_page("http://c.example/", "<p>c</p>"),
    );
    let harness = Harness::start(fetcher, CrawlSettings::default()).await;

    for seed in ["http://a.example/", "http://b.example/", "http://c.example/"] {
        harness.queue.publish("job", seed, 0).await.unwrap();
    }
    harness.wait_until_done(3).await;

    let status = harness.store.status("job").await.unwrap();
    assert_eq!(status.done, 3);
    assert_eq!(status.processing, 0);

    harness.queue.shutdown().await;
}
