//! Native HTTP speed test against a Cloudflare-style speed endpoint.
//!
//! `GET  {base}/__down?bytes=N` streams N bytes back.
//! `POST {base}/__up` accepts and discards the request body.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use rand::RngCore;
use reqwest::Client;
use tracing::debug;

use super::{mbps, ProviderKind, ProviderMeta, SpeedTestProvider, SpeedTestRequest, SpeedTestResult};
use crate::bench::BenchResult;

pub struct CloudflareProvider;

impl CloudflareProvider {
    fn client(req: &SpeedTestRequest) -> BenchResult<Client> {
        Ok(Client::builder()
            .timeout(req.timeout)
            .user_agent(concat!("benchpack/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }

    async fn ping(client: &Client, req: &SpeedTestRequest) -> BenchResult<Vec<f64>> {
        let url = format!("{}/__down?bytes=0", req.base_url);
        let mut samples = Vec::with_capacity(req.ping_samples as usize);
        for _ in 0..req.ping_samples {
            let start = Instant::now();
            client.get(&url).send().await?.error_for_status()?.bytes().await?;
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(samples)
    }

    async fn download(client: &Client, req: &SpeedTestRequest) -> BenchResult<f64> {
        let url = format!("{}/__down?bytes={}", req.base_url, req.download_bytes);
        let start = Instant::now();
        let resp = client.get(&url).send().await?.error_for_status()?;
        let mut stream = resp.bytes_stream();
        let mut total = 0u64;
        while let Some(chunk) = stream.next().await {
            total += chunk?.len() as u64;
        }
        let secs = start.elapsed().as_secs_f64();
        debug!(total, secs, "download transfer complete");
        Ok(mbps(total, secs))
    }

    async fn upload(client: &Client, req: &SpeedTestRequest) -> BenchResult<f64> {
        let mut payload = vec![0u8; req.upload_bytes as usize];
        rand::thread_rng().fill_bytes(&mut payload);
        let payload = Bytes::from(payload);
        let len = payload.len() as u64;

        let url = format!("{}/__up", req.base_url);
        let start = Instant::now();
        client.post(&url).body(payload).send().await?.error_for_status()?;
        let secs = start.elapsed().as_secs_f64();
        debug!(len, secs, "upload transfer complete");
        Ok(mbps(len, secs))
    }
}

/// Minimum RTT and mean absolute difference between consecutive samples.
pub fn ping_stats(samples: &[f64]) -> Option<(f64, f64)> {
    let min = samples.iter().copied().reduce(f64::min)?;
    let jitter = if samples.len() > 1 {
        let diffs: f64 = samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
        diffs / (samples.len() - 1) as f64
    } else {
        0.0
    };
    Some((min, jitter))
}

#[async_trait]
impl SpeedTestProvider for CloudflareProvider {
    fn meta(&self) -> ProviderMeta {
        ProviderMeta {
            id: "cloudflare",
            display_name: "Cloudflare speed endpoint",
            kind: ProviderKind::NativeHttp,
            description: "Built-in HTTP test: timed ping, streamed download and upload.",
            install_hint: "No installation needed.",
            licensing_note: None,
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn run(&self, req: SpeedTestRequest) -> BenchResult<SpeedTestResult> {
        let client = Self::client(&req)?;

        let samples = Self::ping(&client, &req).await?;
        let (latency, jitter) = match ping_stats(&samples) {
            Some((min, jitter)) => (Some(min), Some(jitter)),
            None => (None, None),
        };
        let download = Self::download(&client, &req).await?;
        let upload = Self::upload(&client, &req).await?;

        Ok(SpeedTestResult {
            provider_id: "cloudflare".to_string(),
            download_mbps: Some(download),
            upload_mbps: Some(upload),
            latency_ms: latency,
            jitter_ms: jitter,
            packet_loss_pct: None,
            server: Some(req.base_url.clone()),
            timestamp: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_stats() {
        let (min, jitter) = ping_stats(&[30.0, 12.0, 14.0, 13.0]).unwrap();
        assert_eq!(min, 12.0);
        // |12-30| + |14-12| + |13-14| = 21 over 3 gaps
        assert_eq!(jitter, 7.0);
    }

    #[test]
    fn test_ping_stats_edge_cases() {
        assert!(ping_stats(&[]).is_none());
        assert_eq!(ping_stats(&[5.0]), Some((5.0, 0.0)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let req = SpeedTestRequest {
            timeout: std::time::Duration::from_secs(2),
            base_url: "http://127.0.0.1:9".to_string(),
            download_bytes: 10,
            upload_bytes: 10,
            ping_samples: 1,
        };
        let err = CloudflareProvider.run(req).await.unwrap_err();
        assert!(matches!(err, crate::bench::BenchError::Http(_)));
    }
}
