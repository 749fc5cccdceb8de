//! FileSystem trait for abstracting file I/O.
//!
//! Defined in ironlog-core so services can read and write journals without
//! depending on any specific filesystem implementation. The `LocalFileSystem`
//! adapter lives in ironlog-infra.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Abstraction over filesystem operations.
///
/// This trait allows the service layer to read/write files without coupling
/// to the real filesystem, enabling easy testing with in-memory implementations.
pub trait FileSystem: Send + Sync {
    /// Replace a file's content, creating parent directories as needed.
    ///
    /// Implementations must be all-or-nothing: a reader sees either the old
    /// or the new content, never a partial write.
    fn write_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Append to an existing file. Fails with `NotFound` if the file is missing.
    fn append_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Read a file's content as a string.
    fn read_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<String, std::io::Error>> + Send;

    /// Create a directory and all parent directories.
    fn create_dir_all(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;

    /// Remove a single file.
    fn remove_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send;

    /// Last modification time in milliseconds since the Unix epoch.
    fn modified_millis(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<i64, std::io::Error>> + Send;

    /// List the files directly inside a directory (not recursive).
    fn list_dir(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<Vec<PathBuf>, std::io::Error>> + Send;
}

/// Shared filesystems: the journal store and the indexer usually hold the
/// same instance.
impl<T: FileSystem> FileSystem for Arc<T> {
    fn write_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send {
        (**self).write_file(path, content)
    }

    fn append_file(
        &self,
        path: &Path,
        content: &str,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send {
        (**self).append_file(path, content)
    }

    fn read_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<String, std::io::Error>> + Send {
        (**self).read_file(path)
    }

    fn create_dir_all(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send {
        (**self).create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send {
        (**self).exists(path)
    }

    fn remove_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<(), std::io::Error>> + Send {
        (**self).remove_file(path)
    }

    fn modified_millis(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<i64, std::io::Error>> + Send {
        (**self).modified_millis(path)
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<Vec<PathBuf>, std::io::Error>> + Send {
        (**self).list_dir(path)
    }
}
