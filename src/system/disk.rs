//! Sequential write/read throughput of a scratch file.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use async_trait::async_trait;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::bench::{rate, BenchError, BenchKind, BenchReport, BenchResult, Benchmark};
use crate::config::DiskConfig;

/// Block written repeatedly and read back.
pub const BLOCK_SIZE: usize = 1024 * 1024;

/// Headroom kept free on top of the scratch file itself.
const SPACE_MARGIN_BYTES: u64 = 64 * 1024 * 1024;

/// Available bytes on the filesystem holding `path`, via `df`.
pub fn check_disk_space(path: &Path) -> BenchResult<u64> {
    // df -B1 --output=avail <path>
    let output = Command::new("df")
        .arg("--block-size=1")
        .arg("--output=avail")
        .arg(path)
        .output()?;

    if !output.status.success() {
        return Err(BenchError::ToolFailed {
            tool: "df".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_df_avail(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `df --output=avail`: a header line followed by one number.
fn parse_df_avail(stdout: &str) -> BenchResult<u64> {
    let lines: Vec<&str> = stdout.trim().lines().collect();
    let parse_err = |detail: &str| BenchError::Parse {
        what: "df output".to_string(),
        detail: detail.to_string(),
    };
    if lines.len() < 2 {
        return Err(parse_err("unexpected format"));
    }
    lines
        .last()
        .map(|l| l.trim())
        .ok_or_else(|| parse_err("missing value"))?
        .parse::<u64>()
        .map_err(|e| parse_err(&e.to_string()))
}

/// Refuse to start when the scratch file would not fit. `needed` is `None`
/// when the requested size does not fit in a `u64`.
fn ensure_space(dir: &Path, needed: Option<u64>) -> BenchResult<()> {
    let required = needed.and_then(|n| n.checked_add(SPACE_MARGIN_BYTES));
    match (check_disk_space(dir), required) {
        (Ok(available), Some(required)) if available >= required => {
            debug!(available, required, "free space check passed");
            Ok(())
        }
        (Ok(available), _) => Err(BenchError::InsufficientSpace {
            needed: needed.unwrap_or(u64::MAX),
            available,
        }),
        // No filesystem holds this much, df or not.
        (Err(_), None) => Err(BenchError::InsufficientSpace {
            needed: u64::MAX,
            available: 0,
        }),
        (Err(e), Some(_)) => {
            warn!(error = %e, dir = %dir.display(), "free space check skipped");
            Ok(())
        }
    }
}

/// Measured timings of one disk run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskTimings {
    pub size_mb: u64,
    pub write_secs: f64,
    pub read_secs: f64,
    pub bytes_read: u64,
}

impl DiskTimings {
    pub fn write_mb_s(&self) -> f64 {
        rate(self.size_mb as f64, self.write_secs)
    }

    pub fn read_mb_s(&self) -> f64 {
        rate(self.size_mb as f64, self.read_secs)
    }

    pub fn summary(&self) -> String {
        format!(
            "Write test ({n} MB):\n\
             Write time: {:.2} s, speed: {:.2} MB/s\n\
             Read test ({n} MB):\n\
             Read time: {:.2} s, speed: {:.2} MB/s",
            self.write_secs,
            self.write_mb_s(),
            self.read_secs,
            self.read_mb_s(),
            n = self.size_mb,
        )
    }
}

fn write_test(path: &Path, block: &[u8], size_mb: u64, fsync: bool) -> BenchResult<f64> {
    let start = Instant::now();
    let mut file = File::create(path)?;
    for _ in 0..size_mb {
        file.write_all(block)?;
    }
    file.flush()?;
    if fsync {
        file.sync_all()?;
    }
    Ok(start.elapsed().as_secs_f64())
}

fn read_test(path: &Path) -> BenchResult<(f64, u64)> {
    let mut buf = vec![0u8; BLOCK_SIZE];
    let mut total = 0u64;
    let start = Instant::now();
    let mut file = File::open(path)?;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    Ok((start.elapsed().as_secs_f64(), total))
}

/// Run the write and read passes synchronously. The scratch file is
/// removed whether or not the passes succeed.
pub fn run_blocking(config: &DiskConfig) -> BenchResult<DiskTimings> {
    let path = config.file_path();
    let needed = config.size_mb.checked_mul(BLOCK_SIZE as u64);
    ensure_space(&config.directory, needed)?;

    let mut block = vec![0u8; BLOCK_SIZE];
    rand::thread_rng().fill_bytes(&mut block);

    info!(path = %path.display(), size_mb = config.size_mb, "disk benchmark starting");

    let passes = write_test(&path, &block, config.size_mb, config.fsync)
        .and_then(|write_secs| read_test(&path).map(|read| (write_secs, read)));

    if let Err(e) = fs::remove_file(&path) {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove scratch file");
        }
    }

    let (write_secs, (read_secs, bytes_read)) = passes?;
    Ok(DiskTimings {
        size_mb: config.size_mb,
        write_secs,
        read_secs,
        bytes_read,
    })
}

pub struct DiskBench {
    config: DiskConfig,
}

impl DiskBench {
    pub fn new(config: DiskConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Benchmark for DiskBench {
    fn kind(&self) -> BenchKind {
        BenchKind::Disk
    }

    async fn run(&self) -> BenchResult<BenchReport> {
        let config = self.config.clone();
        let timings = tokio::task::spawn_blocking(move || run_blocking(&config))
            .await
            .map_err(|e| BenchError::Join(e.to_string()))??;

        info!(
            write_mb_s = timings.write_mb_s(),
            read_mb_s = timings.read_mb_s(),
            "disk benchmark finished"
        );

        Ok(BenchReport::new(
            BenchKind::Disk,
            timings.summary(),
            timings.write_secs + timings.read_secs,
        )
        .with_metric("size_mb", timings.size_mb as f64)
        .with_metric("write_secs", timings.write_secs)
        .with_metric("write_mb_s", timings.write_mb_s())
        .with_metric("read_secs", timings.read_secs)
        .with_metric("read_mb_s", timings.read_mb_s()))
    }
}
