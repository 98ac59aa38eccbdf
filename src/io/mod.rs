//! I/O operations module
//!
//! Contains the disk I/O abstraction used by the benchmark and the
//! temporary file guard.

pub mod disk;

pub use disk::{unique_file_name, BenchFile, DiskIO, PlatformDiskIO, TempFile};
