//! Client for a chat-completions vision inference service.
//!
//! One call sends one instruction plus one image and returns the model's
//! text reply. Retrying and label interpretation are left to the caller.

pub mod client;
pub mod error;
pub mod types;

pub use client::{VisionClient, VisionClientConfig, VisionModel};
pub use error::{VisionError, VisionResult};
