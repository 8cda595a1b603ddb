//! Post processing pipeline.
//!
//! A run moves through parse, acquire, enumerate and a per-file
//! classify/upload loop. The working directory is removed on every exit
//! path, including a panic inside one of the stages.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, warn, Instrument};

use psort_media::{
    cleanup_workspace, enumerate_media, InstaloaderDownloader, MediaDownloader, MediaError,
};
use psort_models::{MediaFile, PipelineResult, PostReference, StorageKey};
use psort_storage::ObjectStore;
use psort_vision::VisionModel;

use crate::classifier::{ImageClassifier, ImageLabeler};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::post_lock::PostLocks;
use crate::retry::{Sleeper, TokioSleeper};
use crate::uploader::{ObjectUploader, StorageUploader};

/// Default pause after each uploaded file.
pub const DEFAULT_FILE_PACING: Duration = Duration::from_millis(3000);

/// Runs the pipeline for one post at a time per post ID.
pub struct PipelineOrchestrator {
    downloader: Arc<dyn MediaDownloader>,
    classifier: Arc<dyn ImageLabeler>,
    uploader: Arc<dyn ObjectUploader>,
    sleeper: Arc<dyn Sleeper>,
    file_pacing: Duration,
    locks: PostLocks,
}

impl PipelineOrchestrator {
    pub fn new(
        downloader: Arc<dyn MediaDownloader>,
        classifier: Arc<dyn ImageLabeler>,
        uploader: Arc<dyn ObjectUploader>,
    ) -> Self {
        Self {
            downloader,
            classifier,
            uploader,
            sleeper: Arc::new(TokioSleeper),
            file_pacing: DEFAULT_FILE_PACING,
            locks: PostLocks::new(),
        }
    }

    /// Wire the production stages from configuration.
    pub fn from_config(
        config: &WorkerConfig,
        store: Arc<dyn ObjectStore>,
        model: Arc<dyn VisionModel>,
    ) -> Self {
        let downloader = InstaloaderDownloader::new(config.downloader_config());
        let classifier = ImageClassifier::new(model, config.retry_policy())
            .with_preprocess(config.preprocess_options());
        let uploader = StorageUploader::new(store, config.retry_policy());

        Self::new(Arc::new(downloader), Arc::new(classifier), Arc::new(uploader))
            .with_file_pacing(config.file_pacing)
    }

    pub fn with_file_pacing(mut self, pacing: Duration) -> Self {
        self.file_pacing = pacing;
        self
    }

    /// Replace the sleeper used for pacing between files.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Process one post URL end to end.
    ///
    /// Returns the keys written, in upload order. The first failing file
    /// aborts the run; objects already written stay in the bucket.
    pub async fn process(&self, post_url: &str) -> WorkerResult<PipelineResult> {
        let started = Instant::now();

        let result = match PostReference::parse(post_url) {
            Ok(post) => self.process_post(&post).await,
            Err(e) => {
                warn!(post_url = %post_url, "Rejected post URL");
                Err(e.into())
            }
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_run(outcome, started.elapsed());
        result
    }

    async fn process_post(&self, post: &PostReference) -> WorkerResult<PipelineResult> {
        let logger = RunLogger::new(post.post_id(), "post_processing");
        let span = logger.create_span();

        async {
            let _guard = self.locks.acquire(post.post_id()).await;
            logger.log_start(post.raw_url());

            let work_dir = self.downloader.working_dir_for(post);
            let outcome = AssertUnwindSafe(self.run_stages(post, &logger))
                .catch_unwind()
                .await;

            cleanup_workspace(&work_dir).await;

            match outcome {
                Ok(Ok(result)) => {
                    logger.log_completion(&format!("{} file(s) stored", result.len()));
                    Ok(result)
                }
                Ok(Err(e)) => {
                    logger.log_error(&e.to_string());
                    Err(e)
                }
                Err(panic) => {
                    logger.log_error("run panicked");
                    std::panic::resume_unwind(panic)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        post: &PostReference,
        logger: &RunLogger,
    ) -> WorkerResult<PipelineResult> {
        let dir = self
            .downloader
            .acquire(post)
            .await
            .map_err(WorkerError::acquisition)?;
        logger.log_progress(&format!("media downloaded to {}", dir.path().display()));

        let files = enumerate_media(dir.path()).await.map_err(|e| match e {
            MediaError::NoMedia(path) => WorkerError::NoMedia(path.display().to_string()),
            MediaError::Io(io) => WorkerError::Io(io),
            other => WorkerError::acquisition(other),
        })?;
        logger.log_progress(&format!("{} file(s) found", files.len()));

        let mut result = PipelineResult::new();
        for file in &files {
            if !file.is_eligible() {
                debug!(
                    file = %file.file_name(),
                    mime = file.declared_mime_type.as_deref().unwrap_or("unknown"),
                    "Skipping file with ineligible type"
                );
                metrics::record_skipped();
                continue;
            }

            if let Err(e) = self.process_file(file, &mut result).await {
                if !result.is_empty() {
                    logger.log_warning(&format!(
                        "run aborted after storing {:?}",
                        result.to_key_strings()
                    ));
                }
                return Err(e);
            }
        }

        if result.is_empty() {
            logger.log_warning("no eligible images in post");
        }
        Ok(result)
    }

    async fn process_file(
        &self,
        file: &MediaFile,
        result: &mut PipelineResult,
    ) -> WorkerResult<()> {
        let label = self.classifier.classify(file.path()).await?;
        let key = StorageKey::new(label, file.file_name());

        self.uploader.upload(&key, file).await?;
        metrics::record_upload(label.as_str());
        result.push(key);

        self.sleeper.sleep(self.file_pacing).await;
        Ok(())
    }
}
