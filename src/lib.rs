//! diskbench - periodic disk throughput benchmark
//!
//! Repeatedly writes and reads back a temporary file, measures the
//! throughput of both phases and serves the latest numbers as
//! Prometheus-style gauges over HTTP.

use std::fmt;
use std::path::PathBuf;

pub mod bench;
pub mod config;
pub mod http;
pub mod io;
pub mod models;
pub mod util;

use models::Phase;

// Common error types
#[derive(Debug)]
pub enum DiskBenchError {
    /// Configuration validation or parsing error
    ConfigError(String),
    /// Benchmark execution error
    BenchmarkError(String),
    /// A benchmark phase failed on the given file
    PhaseFailed {
        phase: Phase,
        path: PathBuf,
        source: std::io::Error,
    },
    /// The temporary benchmark file could not be removed
    CleanupFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// HTTP server error
    ServerError(String),
}

impl fmt::Display for DiskBenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskBenchError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DiskBenchError::BenchmarkError(msg) => write!(f, "Benchmark error: {}", msg),
            DiskBenchError::PhaseFailed { phase, path, source } => write!(
                f,
                "{} phase failed on {}: {}",
                phase,
                path.display(),
                source
            ),
            DiskBenchError::CleanupFailed { path, source } => {
                write!(f, "Failed to remove {}: {}", path.display(), source)
            }
            DiskBenchError::ServerError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for DiskBenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiskBenchError::PhaseFailed { source, .. } => Some(source),
            DiskBenchError::CleanupFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for diskbench operations
pub type Result<T> = std::result::Result<T, DiskBenchError>;

// Common types and constants
pub const APP_NAME: &str = "diskbench";
pub const TEMP_FILE_PREFIX: &str = "diskbench-";
pub const TEMP_FILE_EXTENSION: &str = "bin";
pub const METRICS_PATH: &str = "/metrics";
