//! Crawler binary: submits seed URLs as one job, runs the worker pool until
//! the crawl settles, then prints the status and results report.

mod bootstrap;
mod config;
mod report;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use url::Url;
use uuid::Uuid;

use crawler_core::{JobStore, WorkQueue};
use crawler_logging::{crawl_info, crawl_warn, LogDestination};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    crawler_logging::initialize(LogDestination::Terminal, LevelFilter::Info);

    let seeds: Vec<String> = std::env::args().skip(1).collect();
    if seeds.is_empty() {
        bail!("usage: crawler <seed-url>...");
    }
    for seed in &seeds {
        Url::parse(seed).with_context(|| format!("invalid seed url: {seed}"))?;
    }

    let config = AppConfig::from_env();
    let store = bootstrap::connect_store(&config)
        .await
        .context("connecting job store")?;
    let queue = bootstrap::connect_queue(&config)
        .await
        .context("connecting work queue")?;
    let engine = bootstrap::build_engine(store.clone(), queue.clone(), &config)
        .context("building crawl engine")?;
    queue
        .subscribe(engine)
        .await
        .context("subscribing crawl engine")?;

    let job_id = Uuid::new_v4().to_string();
    store
        .create_job(&job_id)
        .await
        .context("creating the job")?;
    for seed in &seeds {
        if let Err(err) = queue.publish(&job_id, seed, 0).await {
            crawl_warn!("publishing seed failed url={seed}: {err}");
        }
    }
    crawl_info!("job {job_id} submitted with {} seed url(s)", seeds.len());

    wait_for_quiescence(store.as_ref(), &job_id).await?;
    queue.shutdown().await;

    let status = store
        .status(&job_id)
        .await
        .context("reading job status")?;
    let results = store
        .results(&job_id)
        .await
        .context("reading job results")?;

    println!("Job {job_id}");
    print!("{}", report::render_status(&status));
    print!("{}", report::render_results(&results));
    Ok(())
}

/// Waits until the job looks finished: something was completed and nothing
/// has been in flight for a few consecutive polls. Heuristic by design --
/// between a message finishing and the next one passing the visit gate the
/// processing counter legitimately reads zero.
async fn wait_for_quiescence(store: &dyn JobStore, job_id: &str) -> Result<()> {
    let mut settled = 0;
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let status = store
            .status(job_id)
            .await
            .context("polling job status")?;
        if status.done > 0 && status.processing == 0 {
            settled += 1;
            if settled >= 3 {
                return Ok(());
            }
        } else {
            settled = 0;
        }
    }
}
