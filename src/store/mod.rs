//! Snapshot persistence.
//!
//! The aggregator never reads the store; it only replaces its contents with
//! the latest non-empty snapshots.
//!
//! # Submodules
//!
//! - [`json`]: Keeps the latest snapshot in a single JSON file

pub mod json;

use crate::error::StoreError;
use crate::models::SourceSnapshot;
use async_trait::async_trait;

/// Write-only collaborator holding the latest snapshot of every source.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Remove every stored snapshot.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Store `snapshots` alongside whatever is already stored.
    async fn bulk_insert(&self, snapshots: &[SourceSnapshot]) -> Result<(), StoreError>;

    /// Replace the stored data with `snapshots` as one unit of work.
    ///
    /// The default deletes then inserts; stores that can swap contents
    /// atomically should override it.
    async fn replace_all(&self, snapshots: &[SourceSnapshot]) -> Result<(), StoreError> {
        self.delete_all().await?;
        self.bulk_insert(snapshots).await
    }
}
