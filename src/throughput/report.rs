//! Speed test result formatting.

use super::provider::SpeedTestResult;

fn fmt_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2} {}", v, unit),
        None => "n/a".to_string(),
    }
}

/// Format a speed test result as the three-line summary.
pub fn format_summary(result: &SpeedTestResult) -> String {
    format!(
        "Ping: {}\nDownload: {}\nUpload: {}",
        fmt_metric(result.latency_ms, "ms"),
        fmt_metric(result.download_mbps, "Mbps"),
        fmt_metric(result.upload_mbps, "Mbps"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(latency: Option<f64>, down: Option<f64>, up: Option<f64>) -> SpeedTestResult {
        SpeedTestResult {
            provider_id: "cloudflare".to_string(),
            download_mbps: down,
            upload_mbps: up,
            latency_ms: latency,
            jitter_ms: None,
            packet_loss_pct: None,
            server: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_format_summary_full() {
        let summary = format_summary(&result(Some(12.345), Some(245.3), Some(40.0)));
        assert_eq!(summary, "Ping: 12.35 ms\nDownload: 245.30 Mbps\nUpload: 40.00 Mbps");
    }

    #[test]
    fn test_format_summary_missing_upload() {
        let summary = format_summary(&result(None, Some(85.2), None));
        assert!(summary.contains("Ping: n/a"));
        assert!(summary.contains("Download: 85.20 Mbps"));
        assert!(summary.ends_with("Upload: n/a"));
    }
}
