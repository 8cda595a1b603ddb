//! Post media classification worker.
//!
//! This crate provides:
//! - The post processing pipeline (download, classify, upload, cleanup)
//! - Retry with exponential backoff for every remote call
//! - Remote task dispatch on ECS
//! - Structured run logging and pipeline metrics

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod post_lock;
pub mod retry;
pub mod uploader;

pub use classifier::{classification_prompt, ImageClassifier, ImageLabeler};
pub use config::WorkerConfig;
pub use dispatch::{
    DispatchConfig, EcsTaskLauncher, TaskDispatcher, TaskLauncher, TaskRunRequest, POST_URL_ENV,
};
pub use error::{WorkerError, WorkerResult};
pub use logging::{init_tracing, RunLogger};
pub use pipeline::PipelineOrchestrator;
pub use post_lock::PostLocks;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use uploader::{ObjectUploader, StorageUploader};
