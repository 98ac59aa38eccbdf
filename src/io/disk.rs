use rand::Rng;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::{TEMP_FILE_EXTENSION, TEMP_FILE_PREFIX};

/// Disk I/O operations used by the benchmark
pub trait DiskIO: Send + Sync {
    /// Open a file for writing, creating or truncating it
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn BenchFile>>;

    /// Open an existing file for reading
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn BenchFile>>;
}

/// File operations performed during a benchmark phase
pub trait BenchFile: Send {
    /// Write the whole buffer
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Read into the buffer, returning 0 at end of file
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Flush data to durable storage as far as the OS allows
    fn sync_all(&mut self) -> io::Result<()>;
}

/// Temporary benchmark file with automatic cleanup.
///
/// The file is removed when the guard is dropped. Use [`TempFile::remove`]
/// on the success path to surface deletion errors.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl TempFile {
    /// Reserve a fresh, randomly named path in `dir`. Nothing is created yet.
    pub fn new_in(dir: &Path) -> Self {
        Self {
            path: dir.join(unique_file_name()),
            cleanup_on_drop: true,
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, reporting any failure other than "not found"
    pub fn remove(mut self) -> io::Result<()> {
        self.cleanup_on_drop = false;
        remove_if_exists(&self.path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            if let Err(e) = remove_if_exists(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove benchmark file");
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// `diskbench-<16 hex chars>.bin`
pub fn unique_file_name() -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!("{}{:016x}.{}", TEMP_FILE_PREFIX, suffix, TEMP_FILE_EXTENSION)
}

/// Buffered `std::fs` implementation
#[derive(Clone, Debug, Default)]
pub struct PlatformDiskIO;

impl PlatformDiskIO {
    pub fn new() -> Self {
        Self
    }
}

struct PlatformFile {
    file: File,
}

impl BenchFile for PlatformFile {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn sync_all(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }
}

impl DiskIO for PlatformDiskIO {
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn BenchFile>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Box::new(PlatformFile { file }))
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn BenchFile>> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Box::new(PlatformFile { file }))
    }
}
