//! Benchmark engine module
//!
//! Contains the write-then-read benchmark and the background worker
//! that runs it on an interval.

pub mod sequential;
pub mod worker;

// Re-export commonly used types
pub use sequential::SequentialBenchmark;
pub use worker::{log_iteration, run_forever, BenchmarkWorker, IterationReport};
