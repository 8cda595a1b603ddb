//! Post processing worker binary.
//!
//! Runs the pipeline once for the post in `INSTAGRAM_URL` and exits non-zero
//! on failure.

use std::sync::Arc;

use tracing::{error, info};

use psort_storage::S3Client;
use psort_vision::VisionClient;
use psort_worker::{init_tracing, PipelineOrchestrator, WorkerConfig, POST_URL_ENV};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting psort-worker");

    let post_url = match std::env::var(POST_URL_ENV) {
        Ok(url) => url,
        Err(_) => {
            error!("{} not set", POST_URL_ENV);
            std::process::exit(1);
        }
    };

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let store = match S3Client::from_env().await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create storage client: {}", e);
            std::process::exit(1);
        }
    };

    let vision = match VisionClient::from_env() {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to create vision client: {}", e);
            std::process::exit(1);
        }
    };

    let orchestrator =
        PipelineOrchestrator::from_config(&config, Arc::new(store), Arc::new(vision));

    match orchestrator.process(&post_url).await {
        Ok(result) => {
            info!(keys = ?result.to_key_strings(), "Uploaded {} file(s)", result.len());
        }
        Err(e) => {
            error!(kind = e.kind(), "Pipeline failed: {}", e);
            std::process::exit(1);
        }
    }
}
