//! Archive OCR worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mokuro_queue::{JobQueue, ProgressChannel, QueueConfig, ResultStore};
use mokuro_worker::{JobRunner, ProcessingContext, WorkerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("mokuro_worker=info".parse().unwrap())
        .add_directive("mokuro_queue=info".parse().unwrap());

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

    info!("Starting mokuro-worker");

    // Load configuration
    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let queue_config = QueueConfig::from_env();

    // Create queue client and verify connectivity; an unreachable
    // queue at startup is fatal.
    let queue = match JobQueue::new(queue_config.clone()) {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create job queue: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = queue.ping().await {
        error!("Failed to connect to Redis: {}", e);
        std::process::exit(1);
    }
    info!(
        "Connected to Redis at {}:{}",
        queue_config.host, queue_config.port
    );

    // Create storage directories
    for dir in [&config.uploads_dir, &config.temp_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            error!("Failed to create {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    let progress = match ProgressChannel::new(&queue_config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create progress channel: {}", e);
            std::process::exit(1);
        }
    };
    let results = match ResultStore::new(&queue_config) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create result store: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = ProcessingContext::new(config, Arc::new(progress));
    let runner = JobRunner::new(queue, results, ctx);

    // Setup signal handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send(true).ok();
    });

    runner.run(shutdown_rx).await;

    info!("Worker shutdown complete");
}
