//! JSON file snapshot store.
//!
//! The whole snapshot lives in one file:
//! ```text
//! {
//!   "updated_at": "2026-10-19T08:00:00Z",
//!   "sources": [
//!     { "source": "v2ex", "entries": [ { "title": "…", "url": "https://www.v2ex.com/t/1" } ] }
//!   ]
//! }
//! ```
//!
//! [`JsonFileStore::replace_all`] writes a sibling `.tmp` file and renames it
//! over the target, so readers see either the old or the new snapshot.

use crate::error::StoreError;
use crate::models::{SourceSnapshot, StoredSnapshot};
use crate::store::SnapshotStore;
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored snapshot, if one has been written.
    pub async fn load(&self) -> Result<Option<StoredSnapshot>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent).await {
                error!(dir = %parent.display(), error = %e, "Failed to create snapshot dir");
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn encode(sources: Vec<SourceSnapshot>) -> Result<Vec<u8>, StoreError> {
        let stored = StoredSnapshot {
            updated_at: Utc::now(),
            sources,
        };
        Ok(serde_json::to_vec_pretty(&stored)?)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn delete_all(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Deleted stored snapshot");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn bulk_insert(&self, snapshots: &[SourceSnapshot]) -> Result<(), StoreError> {
        let mut sources = self.load().await?.map(|s| s.sources).unwrap_or_default();
        sources.extend_from_slice(snapshots);

        self.ensure_parent().await?;
        fs::write(&self.path, Self::encode(sources)?).await?;
        info!(inserted = snapshots.len(), "Inserted snapshots");
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn replace_all(&self, snapshots: &[SourceSnapshot]) -> Result<(), StoreError> {
        let bytes = Self::encode(snapshots.to_vec())?;
        let temp = self.temp_path();

        self.ensure_parent().await?;
        fs::write(&temp, bytes).await?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            error!(temp = %temp.display(), error = %e, "Failed to move snapshot into place");
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        info!(sources = snapshots.len(), "Replaced stored snapshot");
        Ok(())
    }
}
