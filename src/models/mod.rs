//! Data models module
//!
//! Contains benchmark result structures and the published metrics
//! snapshot.

pub mod metrics;
pub mod result;

// Re-export commonly used types
pub use metrics::{DiskMetrics, MetricsStore};
pub use result::{IterationResult, Phase, PhaseResult};
