//! Units formatting and conversion utilities
//!
//! Provides throughput arithmetic and human-readable formatting of
//! sizes for log output.

use std::time::Duration;

/// One megabyte as used by the published gauges (1 MiB).
pub const MEGABYTE: u64 = 1_048_576;

/// Format bytes into human-readable size with appropriate units
///
/// # Examples
/// ```
/// use diskbench::util::units::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// assert_eq!(format_bytes(1073741824), "1.0 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate throughput in bytes per second.
///
/// Returns `None` when no time elapsed, since the rate is undefined.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use diskbench::util::units::bytes_per_second;
///
/// assert_eq!(bytes_per_second(2048, Duration::from_secs(2)), Some(1024.0));
/// assert_eq!(bytes_per_second(2048, Duration::ZERO), None);
/// ```
pub fn bytes_per_second(bytes: u64, elapsed: Duration) -> Option<f64> {
    if elapsed.is_zero() {
        return None;
    }

    let rate = bytes as f64 / elapsed.as_secs_f64();
    rate.is_finite().then_some(rate)
}

/// Convert a bytes-per-second rate into whole megabytes per second, rounded.
pub fn whole_megabytes_per_second(bytes_per_second: f64) -> u64 {
    if !bytes_per_second.is_finite() || bytes_per_second <= 0.0 {
        return 0;
    }
    (bytes_per_second / MEGABYTE as f64).round() as u64
}

/// Format a megabytes-per-second figure for log output
pub fn format_throughput(megabytes_per_second: u64) -> String {
    format!("{} MB/s", megabytes_per_second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(100 * MEGABYTE), "100.0 MiB");
        assert_eq!(format_bytes(1099511627776), "1.0 TiB");
    }

    #[test]
    fn test_bytes_per_second() {
        let rate = bytes_per_second(MEGABYTE, Duration::from_millis(500)).unwrap();
        assert!((rate - 2.0 * MEGABYTE as f64).abs() < 0.01);

        assert_eq!(bytes_per_second(0, Duration::from_secs(1)), Some(0.0));
        assert_eq!(bytes_per_second(1000, Duration::ZERO), None);
    }

    #[test]
    fn test_whole_megabytes_rounds() {
        assert_eq!(whole_megabytes_per_second(150.0 * MEGABYTE as f64), 150);
        assert_eq!(whole_megabytes_per_second(1.5 * MEGABYTE as f64), 2);
        assert_eq!(whole_megabytes_per_second(1.49 * MEGABYTE as f64), 1);
        assert_eq!(whole_megabytes_per_second(0.0), 0);
        assert_eq!(whole_megabytes_per_second(f64::INFINITY), 0);
        assert_eq!(whole_megabytes_per_second(f64::NAN), 0);
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(format_throughput(120), "120 MB/s");
    }
}
