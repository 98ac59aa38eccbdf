//! Utility functions module
//!
//! Contains helpers for unit conversion and formatting.

pub mod units;

// Re-export commonly used functions
pub use units::{
    bytes_per_second, format_bytes, format_throughput, whole_megabytes_per_second, MEGABYTE,
};
