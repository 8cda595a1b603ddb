//! Post media download using instaloader.
//!
//! The downloader is invoked as `instaloader [extra args] -- -<post_id>` with
//! the working root as its current directory, which makes it write the post's
//! files into `<work_root>/-<post_id>/`. This is the only place in the
//! pipeline that spawns a child process.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use psort_models::PostReference;

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{cleanup_workspace, WorkingDirectory};

/// Default downloader executable.
pub const DEFAULT_DOWNLOADER: &str = "instaloader";

/// Materializes a post's media into a post-scoped working directory.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Directory the downloader populates for `post`.
    fn working_dir_for(&self, post: &PostReference) -> PathBuf;

    /// Download the post's media.
    ///
    /// On failure the working directory has already been removed when the
    /// error is returned. On success the directory is not checked for files.
    async fn acquire(&self, post: &PostReference) -> MediaResult<WorkingDirectory>;
}

/// Downloader configuration.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Executable name or path
    pub program: String,
    /// Arguments placed before the `--` separator
    pub extra_args: Vec<String>,
    /// Directory the downloader runs in; post directories are created here
    pub work_root: PathBuf,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_DOWNLOADER.to_string(),
            extra_args: Vec::new(),
            work_root: std::env::temp_dir().join("psort"),
        }
    }
}

/// [`MediaDownloader`] backed by the instaloader CLI.
#[derive(Debug, Clone)]
pub struct InstaloaderDownloader {
    config: DownloaderConfig,
}

impl InstaloaderDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Positional target understood by instaloader for a single post.
    fn post_target(post: &PostReference) -> String {
        format!("-{}", post.post_id())
    }

    async fn run_downloader(&self, post: &PostReference, dir: &Path) -> MediaResult<()> {
        which::which(&self.config.program)
            .map_err(|_| MediaError::DownloaderNotFound(self.config.program.clone()))?;

        let target = Self::post_target(post);
        let mut args: Vec<&str> = self.config.extra_args.iter().map(String::as_str).collect();
        args.push("--");
        args.push(&target);

        info!(
            post_id = %post.post_id(),
            program = %self.config.program,
            output = %dir.display(),
            "Downloading post media"
        );

        let output = Command::new(&self.config.program)
            .args(&args)
            .current_dir(&self.config.work_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                MediaError::acquisition_failed(
                    format!("failed to run {}: {}", self.config.program, e),
                    None,
                    None,
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!("{} stderr: {}", self.config.program, stderr);

            let last_line = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("Unknown error")
                .trim()
                .to_string();

            return Err(MediaError::acquisition_failed(
                format!("{} failed: {}", self.config.program, last_line),
                Some(stderr),
                output.status.code(),
            ));
        }

        debug!(
            "{} stdout: {}",
            self.config.program,
            String::from_utf8_lossy(&output.stdout)
        );
        Ok(())
    }
}

#[async_trait]
impl MediaDownloader for InstaloaderDownloader {
    fn working_dir_for(&self, post: &PostReference) -> PathBuf {
        self.config.work_root.join(Self::post_target(post))
    }

    async fn acquire(&self, post: &PostReference) -> MediaResult<WorkingDirectory> {
        let dir = self.working_dir_for(post);

        tokio::fs::create_dir_all(&self.config.work_root).await?;

        // Leftovers from a crashed run would be mixed into this run's files.
        if dir.exists() {
            warn!(path = %dir.display(), "Removing stale working directory");
            cleanup_workspace(&dir).await;
        }

        if let Err(e) = self.run_downloader(post, &dir).await {
            cleanup_workspace(&dir).await;
            return Err(e);
        }

        info!(post_id = %post.post_id(), path = %dir.display(), "Downloaded post media");
        Ok(WorkingDirectory::new(dir))
    }
}
