//! Small helpers for text cleanup and file system checks.

use itertools::Itertools;
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Collapse whitespace runs in scraped display text to single spaces and trim
/// the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("\n  Rust\t 1.90  发布\n"), "Rust 1.90 发布");
/// ```
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().join(" ")
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  hello   world \n"), "hello world");
        assert_eq!(clean_text("\n\t\n"), "");
        assert_eq!(clean_text("单行标题"), "单行标题");
        assert_eq!(clean_text("第一行\n   第二行"), "第一行 第二行");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c");
        ensure_writable_dir(&target).await.unwrap();
        assert!(target.is_dir());
        assert!(!target.join("..__probe_write__").exists());
    }
}
