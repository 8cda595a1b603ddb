//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; a binary installs a recorder if it
//! wants them exported.

use std::time::Duration;

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Pipeline runs by outcome (`success` or an error kind).
    pub const PIPELINE_RUNS_TOTAL: &str = "psort_pipeline_runs_total";

    /// Files uploaded by label.
    pub const FILES_UPLOADED_TOTAL: &str = "psort_files_uploaded_total";

    /// Files skipped for an ineligible MIME type.
    pub const FILES_SKIPPED_TOTAL: &str = "psort_files_skipped_total";

    /// Retries by operation.
    pub const RETRIES_TOTAL: &str = "psort_retries_total";

    /// Wall time of a pipeline run in seconds.
    pub const PIPELINE_DURATION_SECONDS: &str = "psort_pipeline_duration_seconds";
}

/// Record a finished pipeline run.
pub fn record_run(outcome: &str, duration: Duration) {
    counter!(
        names::PIPELINE_RUNS_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(names::PIPELINE_DURATION_SECONDS).record(duration.as_secs_f64());
}

pub fn record_upload(label: &str) {
    counter!(
        names::FILES_UPLOADED_TOTAL,
        "label" => label.to_string()
    )
    .increment(1);
}

pub fn record_skipped() {
    counter!(names::FILES_SKIPPED_TOTAL).increment(1);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::PIPELINE_RUNS_TOTAL.starts_with("psort_"));
        assert!(names::RETRIES_TOTAL.contains("retries"));
        assert!(names::PIPELINE_DURATION_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_run("success", Duration::from_millis(5));
        record_upload("cars");
        record_skipped();
        record_retry("vision_inference");
    }
}
