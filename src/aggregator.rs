//! One aggregation run across every configured source.
//!
//! ```text
//! run_once()
//!   ├─► fetch + extract per source (all at once, each bounded by a timeout)
//!   │       └─► failures are logged and become empty snapshots
//!   ├─► wait for every source
//!   ├─► drop empty snapshots
//!   └─► replace the stored snapshot (skipped when nothing was scraped)
//! ```
//!
//! Only a store failure fails a run. A cancelled run never reaches the store.

use crate::error::{FetchError, RunError, SourceError};
use crate::models::{AggregateResult, Entry, SourceConfig, SourceSnapshot};
use crate::scrapers::fetch::Fetch;
use crate::scrapers::scrape_markup;
use crate::sources::all_sources;
use crate::store::SnapshotStore;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Aggregator<F, S> {
    fetcher: F,
    store: S,
    sources: Vec<SourceConfig>,
    fetch_timeout: Duration,
    running: AtomicBool,
}

impl<F, S> Aggregator<F, S>
where
    F: Fetch,
    S: SnapshotStore,
{
    /// Aggregate every registered source into `store`.
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher,
            store,
            sources: all_sources(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceConfig>) -> Self {
        self.sources = sources;
        self
    }

    /// Upper bound on one source's fetch.
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Scrape every source and replace the stored snapshot with the results.
    ///
    /// # Errors
    ///
    /// - [`RunError::AlreadyRunning`] if another run on this aggregator is in flight
    /// - [`RunError::Cancelled`] if `cancel` fires before the store is touched
    /// - [`RunError::Store`] if replacing the snapshot fails
    #[instrument(level = "info", skip_all)]
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<AggregateResult, RunError> {
        let _guard = RunGuard::acquire(&self.running).ok_or(RunError::AlreadyRunning)?;
        let started = Instant::now();
        info!(sources = self.sources.len(), "Hot topic run started");

        let snapshots = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Run cancelled while sources were in flight");
                return Err(RunError::Cancelled);
            }
            snapshots = self.scrape_all() => snapshots,
        };

        let result = AggregateResult::from_snapshots(snapshots);

        if result.is_empty() {
            warn!("No source produced entries; keeping the previous snapshot");
        } else {
            if cancel.is_cancelled() {
                warn!("Run cancelled before the snapshot was replaced");
                return Err(RunError::Cancelled);
            }
            if let Err(e) = self.store.replace_all(&result.snapshots).await {
                error!(error = %e, "Failed to replace stored snapshot");
                return Err(e.into());
            }
        }

        let elapsed = started.elapsed();
        info!(
            stored_sources = result.len(),
            entries = result.total_entries(),
            millis = elapsed.as_millis() as u64,
            "Hot topic run completed"
        );

        Ok(result)
    }

    async fn scrape_all(&self) -> Vec<SourceSnapshot> {
        let tasks: Vec<_> = self
            .sources
            .iter()
            .map(|source| self.scrape_source(source))
            .collect();
        join_all(tasks).await
    }

    async fn scrape_source(&self, source: &SourceConfig) -> SourceSnapshot {
        match self.try_scrape_source(source).await {
            Ok(entries) => {
                info!(
                    source = %source.id,
                    label = source.id.label(),
                    count = entries.len(),
                    "Scraped source"
                );
                SourceSnapshot::new(source.id, entries)
            }
            Err(e) => {
                error!(
                    source = %source.id,
                    label = source.id.label(),
                    error = %e,
                    "Source failed; treating it as empty"
                );
                SourceSnapshot::empty(source.id)
            }
        }
    }

    async fn try_scrape_source(&self, source: &SourceConfig) -> Result<Vec<Entry>, SourceError> {
        let markup = timeout(self.fetch_timeout, self.fetcher.fetch(source))
            .await
            .map_err(|_| FetchError::Timeout {
                source_id: source.id,
                timeout: self.fetch_timeout,
            })??;

        Ok(scrape_markup(source.id, &markup)?)
    }
}

/// Marks a run as in flight until dropped.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::SourceId;
    use crate::store::json::JsonFileStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Outcome {
        Markup(String),
        Delayed(Duration, String),
        Fail,
        Hang,
    }

    struct FakeFetcher {
        outcomes: HashMap<SourceId, Outcome>,
    }

    impl FakeFetcher {
        fn new(outcomes: Vec<(SourceId, Outcome)>) -> Self {
            Self {
                outcomes: outcomes.into_iter().collect(),
            }
        }
    }

    #[async_trait]
    impl Fetch for FakeFetcher {
        async fn fetch(&self, source: &SourceConfig) -> Result<String, FetchError> {
            match self.outcomes.get(&source.id) {
                Some(Outcome::Markup(markup)) => Ok(markup.clone()),
                Some(Outcome::Delayed(delay, markup)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(markup.clone())
                }
                Some(Outcome::Hang) => std::future::pending().await,
                Some(Outcome::Fail) | None => Err(FetchError::Status {
                    source_id: source.id,
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                }),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        DeleteAll,
        BulkInsert(Vec<SourceSnapshot>),
    }

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<Call>>,
        fail: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SnapshotStore for RecordingStore {
        async fn delete_all(&self) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push(Call::DeleteAll);
            if self.fail {
                return Err(std::io::Error::other("disk full").into());
            }
            Ok(())
        }

        async fn bulk_insert(&self, snapshots: &[SourceSnapshot]) -> Result<(), StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::BulkInsert(snapshots.to_vec()));
            Ok(())
        }
    }

    fn v2ex_page(n: usize) -> String {
        let items: String = (0..n)
            .map(|i| format!(r#"<div class="cell"><span class="item_title"><a href="/t/{i}">topic {i}</a></span></div>"#))
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    fn configs(ids: &[SourceId]) -> Vec<SourceConfig> {
        ids.iter().map(SourceId::config).collect()
    }

    #[tokio::test]
    async fn test_all_sources_failing_leaves_store_untouched() {
        let aggregator = Aggregator::new(FakeFetcher::new(vec![]), RecordingStore::default());

        let result = aggregator.run_once(&CancellationToken::new()).await.unwrap();

        assert!(result.is_empty());
        assert!(aggregator.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_sources_store_only_non_empty() {
        let fetcher = FakeFetcher::new(vec![
            (SourceId::V2ex, Outcome::Markup(v2ex_page(10))),
            (SourceId::Weibo, Outcome::Fail),
            (SourceId::Cnblogs, Outcome::Markup("<html><body></body></html>".to_string())),
        ]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::default())
            .with_sources(configs(&[SourceId::V2ex, SourceId::Weibo, SourceId::Cnblogs]));

        let result = aggregator.run_once(&CancellationToken::new()).await.unwrap();

        assert_eq!(result.len(), 1);
        let v2ex = &result.snapshots[0];
        assert_eq!(v2ex.source, SourceId::V2ex);
        assert_eq!(v2ex.entries.len(), 10);
        assert_eq!(v2ex.entries[3].url, "https://www.v2ex.com/t/3");

        assert_eq!(
            aggregator.store.calls(),
            vec![Call::DeleteAll, Call::BulkInsert(result.snapshots.clone())]
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_is_isolated() {
        let broken_segmentfault = r#"<div class="news-list"><div><div><a href="/u/x">x</a><a href="/a/1">no heading</a></div></div></div>"#;
        let fetcher = FakeFetcher::new(vec![
            (SourceId::Segmentfault, Outcome::Markup(broken_segmentfault.to_string())),
            (SourceId::V2ex, Outcome::Markup(v2ex_page(2))),
        ]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::default())
            .with_sources(configs(&[SourceId::Segmentfault, SourceId::V2ex]));

        let result = aggregator.run_once(&CancellationToken::new()).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.snapshots[0].source, SourceId::V2ex);
    }

    #[tokio::test]
    async fn test_store_failure_fails_the_run() {
        let fetcher = FakeFetcher::new(vec![(SourceId::V2ex, Outcome::Markup(v2ex_page(1)))]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::failing())
            .with_sources(configs(&[SourceId::V2ex]));

        let err = aggregator.run_once(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, RunError::Store(_)));
        assert_eq!(aggregator.store.calls(), vec![Call::DeleteAll]);
    }

    #[tokio::test]
    async fn test_hanging_source_times_out() {
        let fetcher = FakeFetcher::new(vec![
            (SourceId::Kr36, Outcome::Hang),
            (SourceId::V2ex, Outcome::Markup(v2ex_page(3))),
        ]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::default())
            .with_sources(configs(&[SourceId::Kr36, SourceId::V2ex]))
            .with_fetch_timeout(Duration::from_millis(50));

        let result = aggregator.run_once(&CancellationToken::new()).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.snapshots[0].source, SourceId::V2ex);
        assert_eq!(result.total_entries(), 3);
    }

    #[tokio::test]
    async fn test_sources_are_fetched_concurrently() {
        let delay = Duration::from_millis(200);
        let cnblogs = r#"<html><body><div id="post_list"><article><section><div><a href="https://www.cnblogs.com/a/p/1.html">post</a></div></section></article></div></body></html>"#;
        let fetcher = FakeFetcher::new(vec![
            (SourceId::V2ex, Outcome::Delayed(delay, v2ex_page(2))),
            (SourceId::Cnblogs, Outcome::Delayed(delay, cnblogs.to_string())),
        ]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::default())
            .with_sources(configs(&[SourceId::V2ex, SourceId::Cnblogs]));

        let started = Instant::now();
        let result = aggregator.run_once(&CancellationToken::new()).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(result.len(), 2);
        assert!(elapsed >= delay, "{elapsed:?}");
        assert!(elapsed < delay * 2, "sources ran one after another: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_overlapping_run_rejected_and_cancel_commits_nothing() {
        let fetcher = FakeFetcher::new(vec![
            (SourceId::V2ex, Outcome::Markup(v2ex_page(1))),
            (SourceId::Weibo, Outcome::Hang),
        ]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::default())
            .with_sources(configs(&[SourceId::V2ex, SourceId::Weibo]))
            .with_fetch_timeout(Duration::from_secs(60));

        let cancel = CancellationToken::new();
        let first = aggregator.run_once(&cancel);
        tokio::pin!(first);

        tokio::select! {
            _ = &mut first => panic!("run should still be waiting on the hanging source"),
            _ = tokio::time::sleep(Duration::from_millis(20)) => {}
        }

        let second = aggregator.run_once(&CancellationToken::new()).await;
        assert!(matches!(second, Err(RunError::AlreadyRunning)));

        cancel.cancel();
        assert!(matches!(first.await, Err(RunError::Cancelled)));
        assert!(aggregator.store.calls().is_empty());

        // guard released: a new run gets past the guard and sees its own cancellation
        let cancelled = CancellationToken::new();
        cancelled.cancel();
        let third = aggregator.run_once(&cancelled).await;
        assert!(matches!(third, Err(RunError::Cancelled)));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_does_not_touch_store() {
        let fetcher = FakeFetcher::new(vec![(SourceId::V2ex, Outcome::Markup(v2ex_page(2)))]);
        let aggregator = Aggregator::new(fetcher, RecordingStore::default())
            .with_sources(configs(&[SourceId::V2ex]));

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = aggregator.run_once(&cancel).await.unwrap_err();
        assert!(matches!(err, RunError::Cancelled));
        assert!(aggregator.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_writes_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher::new(vec![(SourceId::V2ex, Outcome::Markup(v2ex_page(4)))]);
        let aggregator = Aggregator::new(fetcher, JsonFileStore::new(dir.path().join("hot.json")));

        let result = aggregator.run_once(&CancellationToken::new()).await.unwrap();

        let stored = aggregator.store.load().await.unwrap().unwrap();
        assert_eq!(stored.sources, result.snapshots);
        assert_eq!(stored.sources.len(), 1);
        assert_eq!(aggregator.sources().len(), SourceId::ALL.len());
    }
}
