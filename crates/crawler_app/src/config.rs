//! Environment-driven runtime configuration.
//!
//! Backend selection is runtime configuration, not compile-time: setting the
//! Redis URL variables switches the respective subsystem to its clustered
//! backend, and leaving them unset falls back to the in-process one.

use std::env;
use std::str::FromStr;

const STORE_URL_KEY: &str = "CRAWLER_REDIS_STORE_URL";
const QUEUE_URL_KEY: &str = "CRAWLER_REDIS_QUEUE_URL";
const MAX_DEPTH_KEY: &str = "CRAWLER_MAX_DEPTH";
const WORKERS_KEY: &str = "CRAWLER_WORKERS";

const DEFAULT_MAX_DEPTH: u32 = 1;
const DEFAULT_WORKERS: usize = 8;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Redis URL for the job store; `None` selects the in-process store.
    pub store_redis_url: Option<String>,
    /// Redis URL for the work queue; `None` selects the in-process queue.
    pub queue_redis_url: Option<String>,
    /// Maximum link-following hops from a seed URL.
    pub max_depth: u32,
    /// Size of the worker pool consuming the queue.
    pub workers: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            store_redis_url: non_empty(env::var(STORE_URL_KEY).ok()),
            queue_redis_url: non_empty(env::var(QUEUE_URL_KEY).ok()),
            max_depth: parse_or(env::var(MAX_DEPTH_KEY).ok(), DEFAULT_MAX_DEPTH),
            workers: parse_or(env::var(WORKERS_KEY).ok(), DEFAULT_WORKERS),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr + Copy>(value: Option<String>, default: T) -> T {
    value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
