//! Launches a remote pipeline task for one post URL.
//!
//! The URL comes from the first argument, falling back to `INSTAGRAM_URL`.
//! Prints the task ARN, or `none` when no task started.

use std::sync::Arc;

use tracing::{error, info};

use psort_worker::{
    init_tracing, DispatchConfig, EcsTaskLauncher, TaskDispatcher, WorkerConfig, POST_URL_ENV,
};

#[tokio::main]
async fn main() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let post_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(POST_URL_ENV).ok())
        .unwrap_or_default();

    let dispatch_config = match DispatchConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid dispatch configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        cluster = %dispatch_config.cluster,
        task_definition = %dispatch_config.task_definition,
        "Dispatching pipeline task"
    );

    let launcher = match EcsTaskLauncher::new(dispatch_config).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to create task launcher: {}", e);
            std::process::exit(1);
        }
    };

    let dispatcher =
        TaskDispatcher::new(Arc::new(launcher), WorkerConfig::from_env().retry_policy());

    match dispatcher.dispatch(&post_url).await {
        Ok(Some(task_arn)) => println!("{}", task_arn),
        Ok(None) => println!("none"),
        Err(e) => {
            error!(kind = e.kind(), "Dispatch failed: {}", e);
            std::process::exit(1);
        }
    }
}
