//! Working directory ownership and cleanup.
//!
//! A working directory is scoped to one post and owned by one pipeline run.
//! It is created by the downloader and must be removed on every exit path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

/// Handle to the directory a downloader populated for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
    path: PathBuf,
}

impl WorkingDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl AsRef<Path> for WorkingDirectory {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Recursively remove a working directory.
///
/// Never fails. A missing directory is already clean; other errors are
/// logged and swallowed.
pub async fn cleanup_workspace(dir: impl AsRef<Path>) {
    let dir = dir.as_ref();

    match fs::remove_dir_all(dir).await {
        Ok(()) => info!(path = %dir.display(), "Cleaned up working directory"),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %dir.display(), "Working directory already absent");
        }
        Err(e) => warn!(
            path = %dir.display(),
            error = %e,
            "Failed to clean up working directory"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cleanup_removes_nested_tree() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("-abc");
        fs::create_dir_all(dir.join("nested")).await.unwrap();
        fs::write(dir.join("a.jpg"), b"x").await.unwrap();
        fs::write(dir.join("nested").join("b.txt"), b"y").await.unwrap();

        cleanup_workspace(&dir).await;

        assert!(!dir.exists());
        assert!(root.path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_failure_is_swallowed() {
        let root = TempDir::new().unwrap();
        // Removing a regular file as a directory fails with something other
        // than NotFound, regardless of the caller's privileges.
        let not_a_dir = root.path().join("-abc");
        fs::write(&not_a_dir, b"x").await.unwrap();

        cleanup_workspace(&not_a_dir).await;

        assert!(not_a_dir.exists());
        assert!(fs::remove_dir_all(&not_a_dir).await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_missing_directory_is_noop() {
        let root = TempDir::new().unwrap();
        let dir = WorkingDirectory::new(root.path().join("never-created"));

        cleanup_workspace(&dir).await;
        cleanup_workspace(&dir).await;

        assert!(!dir.exists());
    }
}
