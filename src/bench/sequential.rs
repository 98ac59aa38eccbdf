//! Sequential write-then-read benchmark
//!
//! Each iteration writes `blocks_per_iteration` zero-filled blocks to a
//! freshly named file, syncs it, reads it back to end of file and
//! deletes it. All I/O in here is blocking.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use crate::config::BenchmarkConfig;
use crate::io::disk::{DiskIO, PlatformDiskIO, TempFile};
use crate::models::{IterationResult, Phase, PhaseResult};
use crate::{DiskBenchError, Result};

/// Sequential benchmark executor
pub struct SequentialBenchmark<D: DiskIO = PlatformDiskIO> {
    config: BenchmarkConfig,
    disk_io: D,
    block: Vec<u8>,
}

impl SequentialBenchmark<PlatformDiskIO> {
    /// Create a benchmark backed by the platform file system
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        Self::with_disk_io(config, PlatformDiskIO::new())
    }
}

impl<D: DiskIO> SequentialBenchmark<D> {
    pub fn with_disk_io(config: BenchmarkConfig, disk_io: D) -> Result<Self> {
        config.validate()?;

        let block_len = usize::try_from(config.block_size).map_err(|_| {
            DiskBenchError::ConfigError(format!(
                "Block size {} does not fit in memory",
                config.block_size
            ))
        })?;

        Ok(Self {
            config,
            disk_io,
            block: vec![0u8; block_len],
        })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run one write-then-read cycle against a new temporary file.
    ///
    /// The file is deleted whether or not the phases succeed.
    pub fn run_iteration(&self) -> Result<IterationResult> {
        let temp_file = TempFile::new_in(&self.config.work_dir);

        let write = self.write_phase(temp_file.path())?;
        let read = self.read_phase(temp_file.path())?;

        let path = temp_file.path().to_owned();
        temp_file
            .remove()
            .map_err(|source| DiskBenchError::CleanupFailed { path, source })?;

        Ok(IterationResult::new(write, read))
    }

    fn write_phase(&self, path: &Path) -> Result<PhaseResult> {
        let fail = |source| DiskBenchError::PhaseFailed {
            phase: Phase::Write,
            path: path.to_owned(),
            source,
        };

        let start = Instant::now();
        let mut bytes_written = 0u64;

        let mut file = self.disk_io.open_write(path).map_err(fail)?;
        for _ in 0..self.config.blocks_per_iteration {
            file.write_all(&self.block).map_err(fail)?;
            bytes_written += self.block.len() as u64;
        }
        file.sync_all().map_err(fail)?;
        drop(file);

        let elapsed = start.elapsed();
        tracing::debug!(path = %path.display(), bytes = bytes_written, ?elapsed, "write phase done");

        Ok(PhaseResult {
            phase: Phase::Write,
            path: path.to_owned(),
            bytes: bytes_written,
            elapsed,
            block_size: self.config.block_size,
        })
    }

    fn read_phase(&self, path: &Path) -> Result<PhaseResult> {
        let fail = |source| DiskBenchError::PhaseFailed {
            phase: Phase::Read,
            path: path.to_owned(),
            source,
        };

        let mut buffer = vec![0u8; self.block.len()];

        let start = Instant::now();
        let mut bytes_read = 0u64;

        let mut file = self.disk_io.open_read(path).map_err(fail)?;
        loop {
            match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => bytes_read += n as u64,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(fail(e)),
            }
        }
        drop(file);

        let elapsed = start.elapsed();
        tracing::debug!(path = %path.display(), bytes = bytes_read, ?elapsed, "read phase done");

        Ok(PhaseResult {
            phase: Phase::Read,
            path: path.to_owned(),
            bytes: bytes_read,
            elapsed,
            block_size: self.config.block_size,
        })
    }
}
