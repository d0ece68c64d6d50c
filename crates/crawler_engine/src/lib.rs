//! Crawl engine: fetches pages, records discovered images, and republishes
//! outbound links as new work within the depth bound.
mod crawler;
mod fetch;
mod scan;

pub use crawler::{CrawlEngine, CrawlSettings};
pub use fetch::{FetchError, FetchSettings, FetchedPage, PageFetcher, ReqwestFetcher};
pub use scan::{scan_document, PageItem};
