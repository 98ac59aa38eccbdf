use diskbench::bench::{BenchmarkWorker, SequentialBenchmark};
use diskbench::config::BenchmarkConfig;
use diskbench::http;
use diskbench::models::MetricsStore;
use diskbench::util::units::format_bytes;
use diskbench::{DiskBenchError, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BenchmarkConfig::load().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        e
    })?;

    tracing::info!(
        dir = %config.work_dir.display(),
        block_size = %format_bytes(config.block_size),
        blocks = config.blocks_per_iteration,
        interval = %humantime::format_duration(config.interval),
        "{} starting",
        diskbench::APP_NAME
    );

    let benchmark = SequentialBenchmark::new(config.clone())?;
    let listener = TcpListener::bind(config.listen_addr).await.map_err(|e| {
        DiskBenchError::ServerError(format!("failed to bind {}: {}", config.listen_addr, e))
    })?;
    tracing::info!(listen = %config.listen_addr, "serving metrics on {}", diskbench::METRICS_PATH);

    let store = Arc::new(MetricsStore::new());
    let worker = BenchmarkWorker::spawn(benchmark, Arc::clone(&store));

    let served = http::serve(listener, store, shutdown_signal()).await;

    tracing::info!("shutting down, waiting for the current iteration");
    worker.shutdown().await?;
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
