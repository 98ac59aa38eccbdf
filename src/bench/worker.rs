//! Background benchmark worker
//!
//! Runs the benchmark forever on its own task: one iteration, publish,
//! log, sleep. A failed iteration is logged and the loop carries on
//! after the normal interval. The blocking file I/O of each iteration
//! runs on tokio's blocking pool.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bench::sequential::SequentialBenchmark;
use crate::io::disk::DiskIO;
use crate::models::{DiskMetrics, IterationResult, MetricsStore};
use crate::util::units::format_throughput;
use crate::{DiskBenchError, Result};

/// Outcome of one loop turn, handed to the log callback
#[derive(Debug)]
pub struct IterationReport<'a> {
    /// 1-based iteration counter
    pub iteration: u64,
    pub outcome: &'a Result<IterationResult>,
    /// What was published, `None` if the iteration failed or had no usable throughput
    pub published: Option<DiskMetrics>,
}

/// Run iterations until `shutdown` flips to `true` or its sender is dropped.
///
/// `publish` receives the rounded read/write pair of every iteration with a
/// defined throughput; `log` receives every iteration, failed or not.
pub async fn run_forever<D, P, L>(
    benchmark: Arc<SequentialBenchmark<D>>,
    mut shutdown: watch::Receiver<bool>,
    mut publish: P,
    mut log: L,
) where
    D: DiskIO + 'static,
    P: FnMut(DiskMetrics),
    L: FnMut(&IterationReport<'_>),
{
    let interval = benchmark.config().interval;
    let mut iteration = 0u64;

    loop {
        if *shutdown.borrow() {
            break;
        }
        iteration += 1;

        let bench = Arc::clone(&benchmark);
        let outcome = tokio::task::spawn_blocking(move || bench.run_iteration())
            .await
            .unwrap_or_else(|e| {
                Err(DiskBenchError::BenchmarkError(format!(
                    "iteration task failed: {}",
                    e
                )))
            });

        let published = outcome.as_ref().ok().and_then(DiskMetrics::from_iteration);
        if let Some(metrics) = published {
            publish(metrics);
        }

        log(&IterationReport {
            iteration,
            outcome: &outcome,
            published,
        });

        let stop = tokio::select! {
            _ = tokio::time::sleep(interval) => false,
            changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
        };
        if stop {
            break;
        }
    }

    tracing::info!(iterations = iteration, "benchmark worker stopped");
}

/// The per-iteration results line for a published iteration
pub fn results_line(iteration: u64, elapsed: Duration, metrics: &DiskMetrics) -> String {
    format!(
        "Disk Bench Results: iteration {} took {:.3}s, Read {}, Write {}",
        iteration,
        elapsed.as_secs_f64(),
        format_throughput(metrics.read_megabytes_per_second),
        format_throughput(metrics.write_megabytes_per_second),
    )
}

/// Default log callback: one line per iteration
pub fn log_iteration(report: &IterationReport<'_>) {
    match (report.outcome, report.published) {
        (Ok(result), Some(metrics)) => tracing::info!(
            iteration = report.iteration,
            elapsed_secs = result.total_elapsed().as_secs_f64(),
            read_mbps = metrics.read_megabytes_per_second,
            write_mbps = metrics.write_megabytes_per_second,
            "{}",
            results_line(report.iteration, result.total_elapsed(), &metrics)
        ),
        (Ok(result), None) => tracing::warn!(
            iteration = report.iteration,
            "iteration finished too fast to measure, not publishing: {}",
            result.summary()
        ),
        (Err(err), _) => tracing::error!(
            iteration = report.iteration,
            error = %err,
            "benchmark iteration failed"
        ),
    }
}

/// Handle to the spawned benchmark loop
pub struct BenchmarkWorker {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl BenchmarkWorker {
    /// Spawn the loop, publishing into `store` and logging via `tracing`
    pub fn spawn<D>(benchmark: SequentialBenchmark<D>, store: Arc<MetricsStore>) -> Self
    where
        D: DiskIO + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let benchmark = Arc::new(benchmark);

        let handle = tokio::spawn(run_forever(
            benchmark,
            shutdown_rx,
            move |metrics| store.publish(metrics),
            log_iteration,
        ));

        Self { handle, shutdown }
    }

    /// Whether the loop has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop after the current iteration and wait for the loop to exit.
    ///
    /// An in-flight iteration finishes, so its temporary file is removed.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.handle
            .await
            .map_err(|e| DiskBenchError::BenchmarkError(format!("worker task failed: {}", e)))
    }
}
