use diskbench::bench::{run_forever, IterationReport, SequentialBenchmark};
use diskbench::config::BenchmarkConfig;
use diskbench::io::{BenchFile, DiskIO, PlatformDiskIO};
use diskbench::models::{MetricsStore, Phase};
use diskbench::DiskBenchError;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::watch;

/// Fails the first write phase after the file has been created.
#[derive(Default)]
struct FlakyDisk {
    opens: AtomicUsize,
}

struct BrokenWriter {
    _inner: Box<dyn BenchFile>,
}

impl BenchFile for BrokenWriter {
    fn write_all(&mut self, _buf: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "simulated I/O error"))
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }

    fn sync_all(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DiskIO for FlakyDisk {
    fn open_write(&self, path: &Path) -> io::Result<Box<dyn BenchFile>> {
        let inner = PlatformDiskIO::new().open_write(path)?;
        if self.opens.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(Box::new(BrokenWriter { _inner: inner }));
        }
        Ok(inner)
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn BenchFile>> {
        PlatformDiskIO::new().open_read(path)
    }
}

fn config(dir: &Path) -> BenchmarkConfig {
    BenchmarkConfig::default()
        .with_work_dir(dir.to_path_buf())
        .with_block_size(64 * 1024)
        .with_blocks_per_iteration(4)
        .with_interval(Duration::from_millis(20))
}

#[test]
fn test_iteration_round_trip_leaves_no_file() {
    let temp_dir = tempdir().unwrap();
    let bench = SequentialBenchmark::new(config(temp_dir.path())).unwrap();

    let result = bench.run_iteration().unwrap();
    assert_eq!(result.write.bytes, 4 * 64 * 1024);
    assert_eq!(result.read.bytes, result.write.bytes);

    let name = result.write.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("diskbench-") && name.ends_with(".bin"));
    assert!(!result.write.path.exists());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_loop_survives_write_failure() {
    let temp_dir = tempdir().unwrap();
    let bench = SequentialBenchmark::with_disk_io(config(temp_dir.path()), FlakyDisk::default())
        .unwrap();

    let store = Arc::new(MetricsStore::new());
    let reports = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = watch::channel(false);

    let task = {
        let store = Arc::clone(&store);
        let reports = Arc::clone(&reports);
        let dir = temp_dir.path().to_path_buf();
        tokio::spawn(run_forever(
            Arc::new(bench),
            rx,
            move |metrics| store.publish(metrics),
            move |report: &IterationReport<'_>| {
                let leftovers = std::fs::read_dir(&dir).unwrap().count();
                let failure = match report.outcome {
                    Ok(_) => None,
                    Err(DiskBenchError::PhaseFailed { phase, .. }) => Some(*phase),
                    Err(other) => panic!("unexpected error: {}", other),
                };
                let mut reports = reports.lock().unwrap();
                reports.push((report.iteration, failure, leftovers));
                if reports.len() == 2 {
                    let _ = tx.send(true);
                }
            },
        ))
    };

    tokio::time::timeout(Duration::from_secs(30), task)
        .await
        .unwrap()
        .unwrap();

    let reports = reports.lock().unwrap();
    assert_eq!(reports[0], (1, Some(Phase::Write), 0));
    assert_eq!(reports[1], (2, None, 0));
    assert!(store.is_ready());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
