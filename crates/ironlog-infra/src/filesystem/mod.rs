//! Filesystem adapter for ironlog.
//!
//! Implements the `FileSystem` trait from `ironlog-core` on top of
//! `tokio::fs`, and resolves the data directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

use ironlog_core::service::fs::FileSystem;
use tokio::io::AsyncWriteExt;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling path used to stage a write before renaming it into place.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{n}.tmp", std::process::id()))
}

/// Local filesystem implementation of the `FileSystem` trait.
///
/// Whole-file writes go to a temporary sibling first and are renamed over
/// the target, so readers never see a half-written journal.
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFileSystem {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let staging = staging_path(path);
        if let Err(e) = tokio::fs::write(&staging, content).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        Ok(())
    }

    async fn append_file(&self, path: &Path, content: &str) -> Result<(), std::io::Error> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await
    }

    async fn read_file(&self, path: &Path) -> Result<String, std::io::Error> {
        tokio::fs::read_to_string(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), std::io::Error> {
        tokio::fs::create_dir_all(path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove_file(&self, path: &Path) -> Result<(), std::io::Error> {
        tokio::fs::remove_file(path).await
    }

    async fn modified_millis(&self, path: &Path) -> Result<i64, std::io::Error> {
        let modified = tokio::fs::metadata(path).await?.modified()?;
        let since_epoch = modified
            .duration_since(UNIX_EPOCH)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(since_epoch.as_millis() as i64)
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `IRONLOG_DATA_DIR` environment variable
/// 2. `~/.ironlog`
/// 3. `./.ironlog`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("IRONLOG_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".ironlog");
    }

    PathBuf::from(".ironlog")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_and_read_file() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let file_path = dir.path().join("kira.md");

        fs.write_file(&file_path, "# Ironsworn: Kira").await.unwrap();
        assert_eq!(fs.read_file(&file_path).await.unwrap(), "# Ironsworn: Kira");
    }

    #[tokio::test]
    async fn test_write_replaces_and_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let file_path = dir.path().join("nested").join("kira.md");

        fs.write_file(&file_path, "first").await.unwrap();
        fs.write_file(&file_path, "second").await.unwrap();
        assert_eq!(fs.read_file(&file_path).await.unwrap(), "second");

        let listed = fs.list_dir(&dir.path().join("nested")).await.unwrap();
        assert_eq!(listed, vec![file_path]);
    }

    #[tokio::test]
    async fn test_append_requires_existing_file() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let file_path = dir.path().join("kira.md");

        let err = fs.append_file(&file_path, "x").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);

        fs.write_file(&file_path, "a").await.unwrap();
        fs.append_file(&file_path, "\nb\n").await.unwrap();
        assert_eq!(fs.read_file(&file_path).await.unwrap(), "a\nb\n");
    }

    #[tokio::test]
    async fn test_modified_millis_and_remove() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        let file_path = dir.path().join("kira.md");

        fs.write_file(&file_path, "x").await.unwrap();
        assert!(fs.modified_millis(&file_path).await.unwrap() > 0);

        fs.remove_file(&file_path).await.unwrap();
        assert!(!fs.exists(&file_path).await);
        assert_eq!(
            fs.modified_millis(&file_path).await.unwrap_err().kind(),
            std::io::ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_list_dir_skips_directories() {
        let dir = tempdir().unwrap();
        let fs = LocalFileSystem::new();
        fs.write_file(&dir.path().join("b.md"), "b").await.unwrap();
        fs.write_file(&dir.path().join("a.md"), "a").await.unwrap();
        fs.create_dir_all(&dir.path().join(".memory-index")).await.unwrap();

        let listed = fs.list_dir(dir.path()).await.unwrap();
        assert_eq!(listed, vec![dir.path().join("a.md"), dir.path().join("b.md")]);
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("IRONLOG_DATA_DIR", "/tmp/test-ironlog");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-ironlog"));
        unsafe {
            std::env::remove_var("IRONLOG_DATA_DIR");
        }
    }
}
