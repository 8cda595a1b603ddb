//! Media acquisition and preparation for the PostSort pipeline.
//!
//! This crate provides:
//! - Post download through the instaloader CLI
//! - Working directory enumeration with extension-derived MIME types
//! - Bounded JPEG re-encoding of images for vision inference
//! - Best-effort working directory cleanup

pub mod download;
pub mod enumerate;
pub mod error;
pub mod fs_utils;
pub mod preprocess;

pub use download::{DownloaderConfig, InstaloaderDownloader, MediaDownloader, DEFAULT_DOWNLOADER};
pub use enumerate::{enumerate_media, mime_from_extension};
pub use error::{MediaError, MediaResult};
pub use fs_utils::{cleanup_workspace, WorkingDirectory};
pub use preprocess::{prepare_for_inference, PreparedImage, PreprocessOptions};
