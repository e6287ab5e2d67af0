//! Command-line interface definitions for hot_topics.
//!
//! All options can be provided via command-line flags or environment variables.

use crate::models::{SourceConfig, SourceId};
use crate::sources::all_sources;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Command-line arguments for hot_topics.
///
/// # Examples
///
/// ```sh
/// # Scrape every source once and exit
/// hot_topics --once -o ./data/hot.json
///
/// # Run every 30 minutes
/// hot_topics -o ./data/hot.json -s "0 */30 * * * *"
///
/// # Only scrape two sources
/// hot_topics --once --source v2ex --source weibo
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON file holding the latest snapshot
    #[arg(short, long, env = "HOT_TOPICS_OUTPUT", default_value = "./hot_topics.json")]
    pub output: PathBuf,

    /// Cron schedule with a leading seconds field
    #[arg(short, long, env = "HOT_TOPICS_SCHEDULE", default_value = "0 0 * * * *")]
    pub schedule: String,

    /// Run a single aggregation and exit
    #[arg(long)]
    pub once: bool,

    /// Per-source fetch timeout in seconds
    #[arg(long, env = "HOT_TOPICS_FETCH_TIMEOUT", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// User agent sent with every request
    #[arg(long, env = "HOT_TOPICS_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Restrict runs to these sources (repeatable; default: all)
    #[arg(long = "source", value_enum)]
    pub sources: Vec<SourceId>,
}

impl Cli {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Sources to scrape, in registry order.
    pub fn selected_sources(&self) -> Vec<SourceConfig> {
        all_sources()
            .into_iter()
            .filter(|s| self.sources.is_empty() || self.sources.contains(&s.id))
            .collect()
    }
}
