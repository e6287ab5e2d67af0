//! # hot_topics
//!
//! Periodically scrapes "trending topic" listings from a fixed set of sites
//! (cnblogs, V2EX, SegmentFault, Weixin, Douban, IT之家, 36氪, 百度, 贴吧 and
//! 微博), normalizes each listing into (title, url) entries and replaces the
//! stored snapshot with the fresh data.
//!
//! ## Usage
//!
//! ```sh
//! hot_topics --once -o ./data/hot.json
//! hot_topics -o ./data/hot.json -s "0 */30 * * * *"
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: Download every source's listing page concurrently
//! 2. **Extraction**: Apply each source's extraction rule to its page
//! 3. **Aggregation**: Drop failed and empty sources
//! 4. **Output**: Atomically replace the JSON snapshot file

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod error;
mod models;
mod scheduler;
mod scrapers;
mod sources;
mod store;
mod utils;

use aggregator::Aggregator;
use cli::Cli;
use scheduler::start_scheduler;
use scrapers::fetch::HttpFetcher;
use store::json::JsonFileStore;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hot_topics starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Early check: ensure the snapshot directory is writable
    let output_dir = args
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Snapshot directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let fetcher = HttpFetcher::new(&args.user_agent, args.fetch_timeout())?;
    let store = JsonFileStore::new(&args.output);
    info!(path = %store.path().display(), "Using JSON snapshot store");
    let aggregator = Arc::new(
        Aggregator::new(fetcher, store)
            .with_sources(args.selected_sources())
            .with_fetch_timeout(args.fetch_timeout()),
    );
    info!(sources = aggregator.sources().len(), "Aggregator ready");

    // --- Shutdown on Ctrl-C ---
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
                cancel.cancel();
            }
        }
    });

    if args.once {
        let result = aggregator.run_once(&cancel).await?;
        info!(
            stored_sources = result.len(),
            entries = result.total_entries(),
            secs = start_time.elapsed().as_secs(),
            "Single run complete"
        );
        return Ok(());
    }

    let mut scheduler = start_scheduler(Arc::clone(&aggregator), &args.schedule, cancel.clone()).await?;
    cancel.cancelled().await;
    scheduler.shutdown().await?;

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");

    Ok(())
}
