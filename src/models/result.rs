//! Benchmark result data models
//!
//! Contains the per-phase and per-iteration measurements produced by
//! the benchmark runner.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::util::units::{bytes_per_second, format_throughput, whole_megabytes_per_second};

/// One of the two timed operations of an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Write,
    Read,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Write => "write",
            Phase::Read => "read",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement of a single phase
#[derive(Debug, Clone)]
pub struct PhaseResult {
    /// Which phase was measured
    pub phase: Phase,
    /// File the phase operated on
    pub path: PathBuf,
    /// Total bytes transferred
    pub bytes: u64,
    /// Wall-clock time measured with a monotonic clock
    pub elapsed: Duration,
    /// Block size used for each I/O call
    pub block_size: u64,
}

impl PhaseResult {
    /// Elapsed time in seconds
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Throughput in bytes per second, `None` if the phase took no measurable time
    pub fn bytes_per_second(&self) -> Option<f64> {
        bytes_per_second(self.bytes, self.elapsed)
    }

    /// Throughput in whole megabytes per second
    pub fn megabytes_per_second(&self) -> Option<u64> {
        self.bytes_per_second().map(whole_megabytes_per_second)
    }
}

/// One complete write-then-read cycle
#[derive(Debug, Clone)]
pub struct IterationResult {
    pub write: PhaseResult,
    pub read: PhaseResult,
    /// When the iteration finished
    pub completed_at: DateTime<Utc>,
}

impl IterationResult {
    pub fn new(write: PhaseResult, read: PhaseResult) -> Self {
        Self {
            write,
            read,
            completed_at: Utc::now(),
        }
    }

    /// Sum of the write and read phase durations
    pub fn total_elapsed(&self) -> Duration {
        self.write.elapsed + self.read.elapsed
    }

    /// Human-readable summary used in logs
    pub fn summary(&self) -> String {
        let rate = |phase: &PhaseResult| match phase.megabytes_per_second() {
            Some(mbps) => format_throughput(mbps),
            None => "n/a".to_string(),
        };
        format!(
            "Read {}, Write {} in {:.3}s",
            rate(&self.read),
            rate(&self.write),
            self.total_elapsed().as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::units::MEGABYTE;

    fn phase(phase: Phase, bytes: u64, elapsed: Duration) -> PhaseResult {
        PhaseResult {
            phase,
            path: PathBuf::from("diskbench-test.bin"),
            bytes,
            elapsed,
            block_size: MEGABYTE,
        }
    }

    #[test]
    fn test_phase_throughput() {
        let write = phase(Phase::Write, 100 * MEGABYTE, Duration::from_millis(500));
        assert_eq!(write.megabytes_per_second(), Some(200));
        assert!((write.seconds() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_elapsed_has_no_throughput() {
        let read = phase(Phase::Read, MEGABYTE, Duration::ZERO);
        assert_eq!(read.bytes_per_second(), None);
        assert_eq!(read.megabytes_per_second(), None);
    }

    #[test]
    fn test_iteration_total_and_summary() {
        let result = IterationResult::new(
            phase(Phase::Write, 120 * MEGABYTE, Duration::from_secs(1)),
            phase(Phase::Read, 120 * MEGABYTE, Duration::from_millis(800)),
        );
        assert_eq!(result.total_elapsed(), Duration::from_millis(1800));

        let summary = result.summary();
        assert!(summary.contains("Read 150 MB/s"));
        assert!(summary.contains("Write 120 MB/s"));
        assert!(summary.contains("1.800s"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Write.to_string(), "write");
        assert_eq!(Phase::Read.to_string(), "read");
    }
}
