//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for pipeline runs with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the
/// default `psort=info` filter.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("psort=info,info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Run logger for structured logging with consistent formatting.
///
/// Every line carries the post ID and the operation name.
#[derive(Debug, Clone)]
pub struct RunLogger {
    post_id: String,
    operation: String,
}

impl RunLogger {
    /// Create a new run logger.
    ///
    /// # Arguments
    /// * `post_id` - The post the run works on
    /// * `operation` - The type of operation (e.g., "post_processing", "task_dispatch")
    pub fn new(post_id: &str, operation: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            post_id = %self.post_id,
            operation = %self.operation,
            "Run started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            post_id = %self.post_id,
            operation = %self.operation,
            "Run progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            post_id = %self.post_id,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            post_id = %self.post_id,
            operation = %self.operation,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            post_id = %self.post_id,
            operation = %self.operation,
            "Run completed: {}", message
        );
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            post_id = %self.post_id,
            operation = %self.operation
        )
    }
}
