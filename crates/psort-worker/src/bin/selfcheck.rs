use std::path::Path;

use psort_storage::S3Client;
use psort_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with work_dir={}",
        config.work_dir
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_downloader(&config.downloader_bin)?;
    ensure_env_present(&["AWS_DEFAULT_REGION", "AWS_BUCKET_NAME"])?;
    ensure_any_env_present(&["OPENAI_API_KEY", "OPEN_AI_API_KEY"])?;

    if std::env::args().any(|arg| arg == "--with-storage") {
        let _ = rustls::crypto::ring::default_provider().install_default();
        ensure_storage().await?;
    }

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

fn ensure_downloader(program: &str) -> anyhow::Result<()> {
    which::which(program)
        .map_err(|e| anyhow::anyhow!("downloader `{}` not available: {}", program, e))?;
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}

fn ensure_any_env_present(vars: &[&str]) -> anyhow::Result<()> {
    if vars.iter().any(|var| std::env::var(var).is_ok()) {
        Ok(())
    } else {
        Err(anyhow::anyhow!("missing env var, set one of {}", vars.join(", ")))
    }
}

async fn ensure_storage() -> anyhow::Result<()> {
    let client = S3Client::from_env().await?;
    client.check_connectivity().await?;
    println!("worker-selfcheck: storage reachable");
    Ok(())
}
