use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bench::BenchResult;
use crate::config::NetworkConfig;

pub mod cloudflare;
pub mod ookla;

/// Metadata describing a speed test provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderMeta {
    pub id: &'static str,                     // "ookla-cli", "cloudflare"
    pub display_name: &'static str,           // "Speedtest.net (Ookla)", ...
    pub kind: ProviderKind,
    pub description: &'static str,
    pub install_hint: &'static str,
    pub licensing_note: Option<&'static str>, // "Personal use only on single device (EULA)"
}

/// How the provider obtains its numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Wraps a vendor CLI.
    ExternalCli,
    /// Measured in-process over HTTP.
    NativeHttp,
}

/// Configuration for a specific test run.
#[derive(Debug, Clone)]
pub struct SpeedTestRequest {
    pub timeout: Duration,
    pub base_url: String,
    pub download_bytes: u64,
    pub upload_bytes: u64,
    pub ping_samples: u32,
}

impl From<&NetworkConfig> for SpeedTestRequest {
    fn from(cfg: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(cfg.timeout_secs),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            download_bytes: cfg.download_bytes,
            upload_bytes: cfg.upload_bytes,
            ping_samples: cfg.ping_samples.max(1),
        }
    }
}

/// Normalized result from any provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedTestResult {
    pub provider_id: String,
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
    pub latency_ms: Option<f64>,
    pub jitter_ms: Option<f64>,
    pub packet_loss_pct: Option<f64>,
    pub server: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Trait for all speed test providers.
#[async_trait]
pub trait SpeedTestProvider: Send + Sync {
    /// Static metadata about the provider.
    fn meta(&self) -> ProviderMeta;

    /// Check if the provider's CLI/dependency is available.
    fn is_available(&self) -> bool;

    /// Run the speed test.
    async fn run(&self, req: SpeedTestRequest) -> BenchResult<SpeedTestResult>;
}

/// All providers, in `auto` preference order.
pub fn registry() -> Vec<Box<dyn SpeedTestProvider>> {
    vec![
        Box::new(ookla::OoklaProvider),
        Box::new(cloudflare::CloudflareProvider),
    ]
}

/// Convert a byte count over `secs` seconds to megabits per second.
pub fn mbps(bytes: u64, secs: f64) -> f64 {
    crate::bench::rate(bytes as f64 * 8.0 / 1_000_000.0, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mbps() {
        assert_eq!(mbps(12_500_000, 1.0), 100.0);
        assert_eq!(mbps(12_500_000, 0.0), 0.0);
    }

    #[test]
    fn test_request_from_config_normalizes() {
        let cfg = NetworkConfig {
            base_url: "https://speed.example/".into(),
            ping_samples: 0,
            ..NetworkConfig::default()
        };
        let req = SpeedTestRequest::from(&cfg);
        assert_eq!(req.base_url, "https://speed.example");
        assert_eq!(req.ping_samples, 1);
        assert_eq!(req.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_registry_order() {
        let ids: Vec<_> = registry().iter().map(|p| p.meta().id).collect();
        assert_eq!(ids, ["ookla-cli", "cloudflare"]);
    }
}
