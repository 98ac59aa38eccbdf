//! Configuration management module
//!
//! Resolves the benchmark configuration at startup from built-in
//! defaults, an optional TOML file and environment variables, in that
//! order of precedence (later wins).

use serde::Deserialize;
use std::env::VarError;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::util::units::MEGABYTE;
use crate::{DiskBenchError, Result};

/// Path to an optional TOML configuration file
pub const ENV_CONFIG_FILE: &str = "DISKBENCH_CONFIG";
pub const ENV_MEGABYTES_PER_BLOCK: &str = "DISKBENCH_MEGABYTES_PER_BLOCK";
pub const ENV_BLOCKS_PER_ITERATION: &str = "DISKBENCH_BLOCKS_PER_ITERATION";
pub const ENV_INTERVAL_SECONDS: &str = "DISKBENCH_INTERVAL_SECONDS";
pub const ENV_WORK_DIR: &str = "DISKBENCH_DIR";
pub const ENV_LISTEN: &str = "DISKBENCH_LISTEN";

pub const DEFAULT_MEGABYTES_PER_BLOCK: u64 = 1;
pub const DEFAULT_BLOCKS_PER_ITERATION: u64 = 100;
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9292";

const MAX_BLOCK_SIZE: u64 = 1024 * MEGABYTE; // 1 GiB

/// Benchmark configuration, immutable once resolved
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Directory the temporary benchmark file is created in
    pub work_dir: PathBuf,
    /// Size of each written block (in bytes)
    pub block_size: u64,
    /// Number of blocks written per iteration
    pub blocks_per_iteration: u64,
    /// Sleep between iterations
    pub interval: Duration,
    /// Address the metrics endpoint listens on
    pub listen_addr: SocketAddr,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            block_size: DEFAULT_MEGABYTES_PER_BLOCK * MEGABYTE,
            blocks_per_iteration: DEFAULT_BLOCKS_PER_ITERATION,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECONDS),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9292)),
        }
    }
}

/// On-disk configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    megabytes_per_block: Option<u64>,
    blocks_per_iteration: Option<u64>,
    interval_seconds: Option<u64>,
    work_dir: Option<PathBuf>,
    listen: Option<String>,
}

impl BenchmarkConfig {
    /// Resolve configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env_value(key, std::env::var(key)))
    }

    /// Resolve configuration using `lookup` for variable access.
    ///
    /// Values are applied on top of the defaults, then the optional
    /// file named by `DISKBENCH_CONFIG`, and validated before return.
    /// A lookup error aborts resolution.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_CONFIG_FILE)? {
            config.apply_file(Path::new(&path))?;
        }

        if let Some(value) = lookup(ENV_MEGABYTES_PER_BLOCK)? {
            let megabytes = parse_positive(ENV_MEGABYTES_PER_BLOCK, &value)?;
            config.block_size = megabytes_to_bytes(ENV_MEGABYTES_PER_BLOCK, megabytes)?;
        }
        if let Some(value) = lookup(ENV_BLOCKS_PER_ITERATION)? {
            config.blocks_per_iteration = parse_positive(ENV_BLOCKS_PER_ITERATION, &value)?;
        }
        if let Some(value) = lookup(ENV_INTERVAL_SECONDS)? {
            config.interval = Duration::from_secs(parse_positive(ENV_INTERVAL_SECONDS, &value)?);
        }
        if let Some(value) = lookup(ENV_WORK_DIR)? {
            config.work_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_LISTEN)? {
            config.listen_addr = parse_listen(ENV_LISTEN, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply the keys present in a TOML file
    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            DiskBenchError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: ConfigFile = toml::from_str(&content).map_err(|e| {
            DiskBenchError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        if let Some(megabytes) = file.megabytes_per_block {
            self.block_size = megabytes_to_bytes("megabytes_per_block", megabytes)?;
        }
        if let Some(blocks) = file.blocks_per_iteration {
            self.blocks_per_iteration = blocks;
        }
        if let Some(seconds) = file.interval_seconds {
            self.interval = Duration::from_secs(seconds);
        }
        if let Some(dir) = file.work_dir {
            self.work_dir = dir;
        }
        if let Some(listen) = file.listen {
            self.listen_addr = parse_listen("listen", &listen)?;
        }
        Ok(())
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.work_dir.exists() {
            return Err(DiskBenchError::ConfigError(format!(
                "Working directory does not exist: {}",
                self.work_dir.display()
            )));
        }

        if !self.work_dir.is_dir() {
            return Err(DiskBenchError::ConfigError(format!(
                "Working directory is not a directory: {}",
                self.work_dir.display()
            )));
        }

        if self.block_size == 0 {
            return Err(DiskBenchError::ConfigError(
                "Block size must be greater than 0".to_string(),
            ));
        }

        if self.block_size > MAX_BLOCK_SIZE {
            return Err(DiskBenchError::ConfigError(format!(
                "Block size too large: {} bytes (max: {} bytes)",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }

        if self.blocks_per_iteration == 0 {
            return Err(DiskBenchError::ConfigError(
                "Blocks per iteration must be greater than 0".to_string(),
            ));
        }

        if self.block_size.checked_mul(self.blocks_per_iteration).is_none() {
            return Err(DiskBenchError::ConfigError(
                "Block size times block count overflows".to_string(),
            ));
        }

        if self.interval.is_zero() {
            return Err(DiskBenchError::ConfigError(
                "Interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_work_dir(mut self, dir: PathBuf) -> Self {
        self.work_dir = dir;
        self
    }

    pub fn with_block_size(mut self, size: u64) -> Self {
        self.block_size = size;
        self
    }

    pub fn with_blocks_per_iteration(mut self, blocks: u64) -> Self {
        self.blocks_per_iteration = blocks;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Map an environment read: unset is `None`, non-UTF-8 is an error
fn env_value(name: &str, value: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(DiskBenchError::ConfigError(format!(
            "{} is not valid UTF-8: {:?}",
            name, raw
        ))),
    }
}

/// Parse a strictly positive integer setting
fn parse_positive(name: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(DiskBenchError::ConfigError(format!(
            "{} must be a positive integer, got 0",
            name
        ))),
        Ok(n) => Ok(n),
        Err(_) => Err(DiskBenchError::ConfigError(format!(
            "{} must be a positive integer, got {:?}",
            name, value
        ))),
    }
}

fn megabytes_to_bytes(name: &str, megabytes: u64) -> Result<u64> {
    megabytes.checked_mul(MEGABYTE).ok_or_else(|| {
        DiskBenchError::ConfigError(format!("{} is too large: {}", name, megabytes))
    })
}

fn parse_listen(name: &str, value: &str) -> Result<SocketAddr> {
    value.trim().parse().map_err(|_| {
        DiskBenchError::ConfigError(format!(
            "{} must be a socket address like {}, got {:?}",
            name, DEFAULT_LISTEN, value
        ))
    })
}
