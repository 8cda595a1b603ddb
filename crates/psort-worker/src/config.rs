//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use psort_media::{DownloaderConfig, PreprocessOptions, DEFAULT_DOWNLOADER};

use crate::retry::RetryPolicy;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root under which per-post working directories are created
    pub work_dir: String,
    /// Downloader executable
    pub downloader_bin: String,
    /// Extra downloader arguments, placed before the post target
    pub downloader_args: Vec<String>,
    /// Pause after each uploaded file
    pub file_pacing: Duration,
    /// Total attempts per remote call
    pub retry_max_attempts: u32,
    /// Delay before the first retry; doubles each attempt
    pub retry_base_delay: Duration,
    /// Longest image side sent to the vision model
    pub vision_max_dimension: u32,
    pub vision_jpeg_quality: u8,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/psort".to_string(),
            downloader_bin: DEFAULT_DOWNLOADER.to_string(),
            downloader_args: Vec::new(),
            file_pacing: Duration::from_millis(3000),
            retry_max_attempts: 6,
            retry_base_delay: Duration::from_millis(1000),
            vision_max_dimension: 512,
            vision_jpeg_quality: 80,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORKER_WORK_DIR").unwrap_or_else(|_| "/tmp/psort".to_string()),
            downloader_bin: std::env::var("DOWNLOADER_BIN")
                .unwrap_or_else(|_| DEFAULT_DOWNLOADER.to_string()),
            downloader_args: std::env::var("DOWNLOADER_ARGS")
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            file_pacing: Duration::from_millis(
                std::env::var("PIPELINE_FILE_PACING_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            ),
            retry_max_attempts: std::env::var("RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
            retry_base_delay: Duration::from_millis(
                std::env::var("RETRY_BASE_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            ),
            vision_max_dimension: std::env::var("VISION_MAX_DIMENSION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(512),
            vision_jpeg_quality: std::env::var("VISION_JPEG_QUALITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(80),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_attempts, self.retry_base_delay)
    }

    pub fn downloader_config(&self) -> DownloaderConfig {
        DownloaderConfig {
            program: self.downloader_bin.clone(),
            extra_args: self.downloader_args.clone(),
            work_root: PathBuf::from(&self.work_dir),
        }
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            max_dimension: self.vision_max_dimension,
            jpeg_quality: self.vision_jpeg_quality,
        }
    }
}

/// Split a comma-separated list, dropping blanks.
pub(crate) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
