//! Published metrics shared between the benchmark worker and the HTTP
//! responder.
//!
//! The store holds at most one snapshot. Publishing replaces the whole
//! snapshot under a write lock, so readers always see a read/write pair
//! from the same iteration.

use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

use super::result::IterationResult;

/// Throughput of one completed iteration, in whole megabytes per second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskMetrics {
    pub read_megabytes_per_second: u64,
    pub write_megabytes_per_second: u64,
    pub published_at: DateTime<Utc>,
}

impl DiskMetrics {
    pub fn new(read_megabytes_per_second: u64, write_megabytes_per_second: u64) -> Self {
        Self {
            read_megabytes_per_second,
            write_megabytes_per_second,
            published_at: Utc::now(),
        }
    }

    /// Derive the published pair from an iteration.
    ///
    /// Returns `None` if either phase has no defined throughput.
    pub fn from_iteration(result: &IterationResult) -> Option<Self> {
        let read = result.read.megabytes_per_second()?;
        let write = result.write.megabytes_per_second()?;
        Some(Self {
            read_megabytes_per_second: read,
            write_megabytes_per_second: write,
            published_at: result.completed_at,
        })
    }
}

/// Latest published metrics. Empty until the first iteration completes.
#[derive(Debug, Default)]
pub struct MetricsStore {
    latest: RwLock<Option<DiskMetrics>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub fn publish(&self, metrics: DiskMetrics) {
        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        *latest = Some(metrics);
    }

    /// Copy of the current snapshot, `None` before the first publish
    pub fn snapshot(&self) -> Option<DiskMetrics> {
        *self.latest.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot().is_some()
    }
}
