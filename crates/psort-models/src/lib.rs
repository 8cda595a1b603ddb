//! Shared data models for the PostSort media pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Post references parsed from social-media post links
//! - Classification labels and label-prefixed storage keys
//! - Media files discovered in a working directory
//! - Pipeline results

pub mod key;
pub mod label;
pub mod media;
pub mod post;

// Re-export common types
pub use key::{PipelineResult, StorageKey};
pub use label::{ClassificationLabel, LabelParseError};
pub use media::{MediaFile, ALLOWED_MIME_TYPES};
pub use post::{parse_post_reference, PostReference, PostReferenceError};
