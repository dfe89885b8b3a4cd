//! Real disk runs against a temporary directory.

use benchpack::bench::{self, BenchKind, Benchmark};
use benchpack::config::{BenchConfig, DiskConfig};
use benchpack::system::disk::{self, BLOCK_SIZE};

fn small_config(dir: &std::path::Path, size_mb: u64) -> DiskConfig {
    DiskConfig {
        directory: dir.to_path_buf(),
        size_mb,
        ..DiskConfig::default()
    }
}

#[test]
fn test_speeds_consistent_with_size_and_time() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path(), 4);

    let t = disk::run_blocking(&config).unwrap();

    assert_eq!(t.size_mb, 4);
    assert_eq!(t.bytes_read, 4 * BLOCK_SIZE as u64);
    assert!(t.write_secs > 0.0);
    assert!(t.read_secs > 0.0);
    assert!((t.write_mb_s() * t.write_secs - 4.0).abs() < 1e-6);
    assert!((t.read_mb_s() * t.read_secs - 4.0).abs() < 1e-6);
}

#[test]
fn test_scratch_file_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path(), 1);

    disk::run_blocking(&config).unwrap();

    assert!(!config.file_path().exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_zero_size_run() {
    let dir = tempfile::tempdir().unwrap();
    let t = disk::run_blocking(&small_config(dir.path(), 0)).unwrap();
    assert_eq!(t.bytes_read, 0);
    assert!(t.summary().starts_with("Write test (0 MB):"));
}

#[tokio::test]
async fn test_disk_benchmark_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = BenchConfig::default();
    config.disk = small_config(dir.path(), 2);

    let report = bench::build(BenchKind::Disk, &config).run().await.unwrap();

    assert_eq!(report.kind, BenchKind::Disk);
    assert_eq!(report.summary.lines().count(), 4);
    assert!(report.metrics["write_mb_s"] > 0.0);
    assert!(report.metrics["read_mb_s"] > 0.0);
    assert_eq!(report.metrics["size_mb"], 2.0);
}
