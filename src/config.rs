//! TOML configuration for benchpack.
//!
//! Layered lookup: an explicit path, the `BENCHPACK_CONFIG` environment
//! variable, `./benchpack.toml`, then compiled-in defaults. Every section
//! is optional and partially specified sections fall back field by field.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "BENCHPACK_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "benchpack.toml";

/// Fixed remote clip used by the video probe.
pub const DEFAULT_VIDEO_URL: &str =
    "https://raw.githubusercontent.com/matisio3/rozne-pliki/refs/heads/main/video.mp4";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for all probes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub disk: DiskConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded benchpack configuration");
        Ok(config)
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit path must load; a broken file named by the environment
    /// or found in the working directory only produces a warning.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "BENCHPACK_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Which speed-test back end to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderChoice {
    /// First available provider, Ookla CLI preferred.
    #[default]
    Auto,
    Ookla,
    Cloudflare,
}

impl std::str::FromStr for ProviderChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ookla" | "ookla-cli" | "speedtest" => Ok(Self::Ookla),
            "cloudflare" => Ok(Self::Cloudflare),
            other => anyhow::bail!("unknown speed test provider: {other}"),
        }
    }
}

/// Speed probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub provider: ProviderChoice,
    /// Base URL of the HTTP speed endpoint.
    pub base_url: String,
    /// Size of the download transfer in bytes.
    pub download_bytes: u64,
    /// Size of the upload payload in bytes.
    pub upload_bytes: u64,
    /// Number of round trips sampled for ping.
    pub ping_samples: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::Auto,
            base_url: "https://speed.cloudflare.com".to_string(),
            download_bytes: 25_000_000,
            upload_bytes: 10_000_000,
            ping_samples: 10,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub url: String,
    /// Cached download; reused when present.
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Path (or bare command name resolved via `$PATH`) to ffmpeg.
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Leave the transcoded file on disk after the run.
    pub keep_output: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_VIDEO_URL.to_string(),
            source_path: PathBuf::from("downloaded_video.mp4"),
            output_path: PathBuf::from("output.avi"),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            keep_output: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Disk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Directory holding the scratch file.
    pub directory: PathBuf,
    pub file_name: String,
    /// Scratch file size in MiB.
    pub size_mb: u64,
    /// Include `fsync` in the write timing.
    pub fsync: bool,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: "benchmark_test_file.bin".to_string(),
            size_mb: 100,
            fsync: true,
        }
    }
}

impl DiskConfig {
    pub fn file_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            duration_secs: 5.0,
            width: 800,
            height: 600,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
