//! Probe catalogue: the four benchmarks, their shared report type and errors.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::BenchConfig;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{tool} not found ({hint})")]
    ToolMissing { tool: String, hint: String },

    #[error("{tool} exited with an error: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("could not parse {what}: {detail}")]
    Parse { what: String, detail: String },

    #[error("not enough free space: need {needed} bytes, {available} available")]
    InsufficientSpace { needed: u64, available: u64 },

    #[error("cannot open video file {path}")]
    VideoOpen { path: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("no speed test provider available")]
    NoProvider,

    #[error("benchmark task failed: {0}")]
    Join(String),
}

pub type BenchResult<T> = std::result::Result<T, BenchError>;

/// The probes offered by the menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchKind {
    Speed,
    Video,
    Disk,
    Render,
}

impl BenchKind {
    pub const ALL: [BenchKind; 4] = [
        BenchKind::Speed,
        BenchKind::Video,
        BenchKind::Disk,
        BenchKind::Render,
    ];

    /// Label of the menu entry.
    pub fn display_name(self) -> &'static str {
        match self {
            BenchKind::Speed => "Speedtest",
            BenchKind::Video => "Video benchmark",
            BenchKind::Disk => "Disk (write/read)",
            BenchKind::Render => "OpenGL FPS",
        }
    }

    /// Text shown next to the spinner while the probe runs.
    pub fn busy_label(self) -> &'static str {
        match self {
            BenchKind::Speed => "Speed test running... please wait ",
            BenchKind::Video => "Video benchmark running... please wait ",
            BenchKind::Disk => "Disk test running... please wait ",
            BenchKind::Render => "OpenGL test running... please wait ",
        }
    }
}

impl fmt::Display for BenchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchKind::Speed => write!(f, "speed"),
            BenchKind::Video => write!(f, "video"),
            BenchKind::Disk => write!(f, "disk"),
            BenchKind::Render => write!(f, "render"),
        }
    }
}

/// Outcome of one successful probe run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub kind: BenchKind,
    /// Human-readable, multi-line result text.
    pub summary: String,
    /// The numbers behind `summary`, keyed by metric name.
    pub metrics: BTreeMap<String, f64>,
    pub elapsed_secs: f64,
    pub finished_at: DateTime<Utc>,
}

impl BenchReport {
    pub fn new(kind: BenchKind, summary: String, elapsed_secs: f64) -> Self {
        Self {
            kind,
            summary,
            metrics: BTreeMap::new(),
            elapsed_secs,
            finished_at: Utc::now(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }
}

/// A probe that can be driven by the runner.
#[async_trait]
pub trait Benchmark: Send + Sync {
    fn kind(&self) -> BenchKind;

    async fn run(&self) -> BenchResult<BenchReport>;
}

/// Build the probe for `kind` from the resolved configuration.
pub fn build(kind: BenchKind, config: &BenchConfig) -> Box<dyn Benchmark> {
    match kind {
        BenchKind::Speed => Box::new(crate::throughput::SpeedBench::new(config.network.clone())),
        BenchKind::Video => Box::new(crate::video::VideoBench::new(config.video.clone())),
        BenchKind::Disk => Box::new(crate::system::disk::DiskBench::new(config.disk.clone())),
        BenchKind::Render => Box::new(crate::render::RenderBench::new(config.render.clone())),
    }
}

/// Throughput in units per second, 0 when no time elapsed.
pub fn rate(amount: f64, secs: f64) -> f64 {
    if secs > 0.0 {
        amount / secs
    } else {
        0.0
    }
}
