//! S3 object storage client.
//!
//! This crate provides:
//! - Environment-driven S3 configuration (AWS or S3-compatible endpoints)
//! - The [`ObjectStore`] seam used by the pipeline's uploader
//! - Single-shot put-object and connectivity checks

pub mod client;
pub mod error;

pub use client::{ObjectStore, S3Client, S3Config};
pub use error::{StorageError, StorageResult};
