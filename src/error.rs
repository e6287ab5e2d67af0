//! Error types for the aggregation pipeline.
//!
//! Per-source failures ([`FetchError`], [`ExtractionError`]) are recoverable:
//! the aggregator logs them and treats the source as empty for the run.
//! [`StoreError`] is the only failure that fails a run.

use crate::models::SourceId;
use std::time::Duration;
use thiserror::Error;

/// Retrieving or decoding one source's listing page failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{source_id}: request failed: {error}")]
    Request {
        source_id: SourceId,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_id}: unexpected HTTP status {status}")]
    Status {
        source_id: SourceId,
        status: reqwest::StatusCode,
    },

    #[error("{source_id}: no response within {timeout:?}")]
    Timeout { source_id: SourceId, timeout: Duration },
}

/// A source's extraction rule could not be applied to its document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("{source_id}: invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        source_id: SourceId,
        selector: &'static str,
        reason: String,
    },

    #[error("{source_id}: expected `{selector}` inside a matched node")]
    MissingNode {
        source_id: SourceId,
        selector: &'static str,
    },
}

/// Failure at the per-source task boundary.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Deleting or writing the stored snapshot failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a run did not complete.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("replacing the stored snapshot failed: {0}")]
    Store(#[from] StoreError),

    #[error("run cancelled before the snapshot was replaced")]
    Cancelled,

    #[error("a previous run is still in progress")]
    AlreadyRunning,
}
