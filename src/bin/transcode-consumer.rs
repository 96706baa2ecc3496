//! # Transcode Consumer
//!
//! Production entry point: loads configuration, bootstraps the SQS and ECS
//! providers and runs the poll loop until SIGINT or SIGTERM.
//!
//! ## Usage
//!
//! ```bash
//! TRANSCODE_QUEUE__URL=https://sqs.us-east-1.amazonaws.com/123/uploads \
//! TRANSCODE_JOB__CLUSTER_ID=transcode \
//! TRANSCODE_JOB__TASK_TEMPLATE_ID=transcoder:3 \
//! TRANSCODE_JOB__CONTAINER_NAME=transcoder \
//! TRANSCODE_NETWORK__SUBNETS=subnet-a,subnet-b \
//! cargo run --bin transcode-consumer
//! ```

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use transcode_consumer::config::ConfigManager;
use transcode_consumer::consumer::bootstrap;
use transcode_consumer::logging;
use transcode_consumer::ConsumerError;

#[tokio::main]
async fn main() {
    logging::init_tracing();

    if let Err(e) = run().await {
        error!(error = %format!("{e:#}"), "Transcode consumer terminated with a fatal error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        build_mode = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Starting transcode consumer"
    );

    let manager = ConfigManager::load().context("failed to load configuration")?;
    info!(
        environment = manager.environment(),
        files = ?manager.loaded_files(),
        "Configuration ready"
    );

    let mut poll_loop = bootstrap(manager.config())
        .await
        .context("failed to bootstrap consumer")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut consumer = tokio::spawn(async move { poll_loop.run(shutdown_rx).await });

    let joined = tokio::select! {
        joined = &mut consumer => joined,
        _ = shutdown_signal() => {
            info!("Shutdown signal received; finishing in-flight message");
            if shutdown_tx.send(true).is_err() {
                warn!("Poll loop already stopped before shutdown was requested");
            }
            consumer.await
        }
    };

    let stats = joined
        .map_err(|join_error| ConsumerError::Fatal(format!("poll loop aborted: {join_error}")))??;

    info!(
        messages = stats.messages,
        deleted = stats.deleted,
        retained = stats.retained,
        "Transcode consumer shutdown complete"
    );

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
