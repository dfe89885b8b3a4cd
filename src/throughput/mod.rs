//! Internet speed probe: ping, download and upload through a pluggable provider.

pub mod provider;
pub mod report;

use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, warn};

use crate::bench::{BenchError, BenchKind, BenchReport, BenchResult, Benchmark};
use crate::config::{NetworkConfig, ProviderChoice};
use provider::{SpeedTestProvider, SpeedTestRequest};

/// Pick the provider for `choice`. An explicitly requested provider is
/// returned even if it looks unavailable so that its own error surfaces.
pub fn select_provider(choice: ProviderChoice) -> BenchResult<Box<dyn SpeedTestProvider>> {
    let mut providers = provider::registry();
    let wanted = match choice {
        ProviderChoice::Ookla => Some("ookla-cli"),
        ProviderChoice::Cloudflare => Some("cloudflare"),
        ProviderChoice::Auto => None,
    };

    let idx = match wanted {
        Some(id) => providers.iter().position(|p| p.meta().id == id),
        None => providers.iter().position(|p| {
            let ok = p.is_available();
            if !ok {
                warn!(provider = p.meta().id, "speed test provider unavailable, skipping");
            }
            ok
        }),
    };

    idx.map(|i| providers.swap_remove(i)).ok_or(BenchError::NoProvider)
}

pub struct SpeedBench {
    config: NetworkConfig,
}

impl SpeedBench {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Benchmark for SpeedBench {
    fn kind(&self) -> BenchKind {
        BenchKind::Speed
    }

    async fn run(&self) -> BenchResult<BenchReport> {
        let provider = select_provider(self.config.provider)?;
        let req = SpeedTestRequest::from(&self.config);
        info!(provider = provider.meta().id, base_url = %req.base_url, "speed test starting");

        let start = Instant::now();
        let result = provider.run(req).await?;
        let elapsed = start.elapsed().as_secs_f64();

        info!(
            provider = %result.provider_id,
            server = ?result.server,
            latency_ms = ?result.latency_ms,
            download_mbps = ?result.download_mbps,
            upload_mbps = ?result.upload_mbps,
            "speed test finished"
        );

        let mut report = BenchReport::new(BenchKind::Speed, report::format_summary(&result), elapsed);
        report.finished_at = result.timestamp;
        for (name, value) in [
            ("ping_ms", result.latency_ms),
            ("jitter_ms", result.jitter_ms),
            ("download_mbps", result.download_mbps),
            ("upload_mbps", result.upload_mbps),
            ("packet_loss_pct", result.packet_loss_pct),
        ] {
            if let Some(v) = value {
                report = report.with_metric(name, v);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_provider_selection() {
        let p = select_provider(ProviderChoice::Cloudflare).unwrap();
        assert_eq!(p.meta().id, "cloudflare");
        let p = select_provider(ProviderChoice::Ookla).unwrap();
        assert_eq!(p.meta().id, "ookla-cli");
    }

    #[test]
    fn test_auto_always_finds_a_provider() {
        // The native provider is always available.
        let p = select_provider(ProviderChoice::Auto).unwrap();
        assert!(p.is_available());
    }
}
