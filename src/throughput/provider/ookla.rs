use super::{ProviderKind, ProviderMeta, SpeedTestProvider, SpeedTestRequest, SpeedTestResult};
use crate::bench::{BenchError, BenchResult};
use async_trait::async_trait;

pub struct OoklaProvider;

const EXE: &str = "speedtest";

#[async_trait]
impl SpeedTestProvider for OoklaProvider {
    fn meta(&self) -> ProviderMeta {
        ProviderMeta {
            id: "ookla-cli",
            display_name: "Speedtest.net (Ookla)",
            kind: ProviderKind::ExternalCli,
            description: "The official Speedtest.net client; picks the best nearby server.",
            install_hint: "Install the official CLI: https://www.speedtest.net/apps/cli",
            licensing_note: Some("Personal Non-Commercial Use Only (EULA)."),
        }
    }

    fn is_available(&self) -> bool {
        std::process::Command::new(EXE)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn run(&self, req: SpeedTestRequest) -> BenchResult<SpeedTestResult> {
        // speedtest --format=json --accept-license --accept-gdpr
        let child = tokio::process::Command::new(EXE)
            .arg("--format=json")
            .arg("--accept-license")
            .arg("--accept-gdpr")
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(req.timeout * 2, child).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BenchError::ToolMissing {
                    tool: EXE.to_string(),
                    hint: self.meta().install_hint.to_string(),
                })
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(BenchError::ToolFailed {
                    tool: EXE.to_string(),
                    stderr: "timed out".to_string(),
                })
            }
        };

        if !output.status.success() {
            return Err(BenchError::ToolFailed {
                tool: EXE.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|e| BenchError::Parse {
                what: "speedtest JSON".to_string(),
                detail: e.to_string(),
            })?;
        Ok(parse_output(json))
    }
}

/// Map the CLI's JSON report onto the normalized result.
/// Bandwidth is reported in bytes per second.
pub fn parse_output(json: serde_json::Value) -> SpeedTestResult {
    let bandwidth_mbps = |section: &str| {
        json.get(section)
            .and_then(|v| v.get("bandwidth"))
            .and_then(|v| v.as_f64())
            .map(|b| b * 8.0 / 1_000_000.0)
    };
    let download = bandwidth_mbps("download");
    let upload = bandwidth_mbps("upload");
    let latency = json.get("ping").and_then(|v| v.get("latency")).and_then(|v| v.as_f64());
    let jitter = json.get("ping").and_then(|v| v.get("jitter")).and_then(|v| v.as_f64());
    let packet_loss = json.get("packetLoss").and_then(|v| v.as_f64());
    let server = json.get("server").and_then(|s| {
        let name = s.get("name")?.as_str()?;
        let location = s.get("location").and_then(|l| l.as_str()).unwrap_or("");
        Some(format!("{} {}", name, location).trim().to_string())
    });

    SpeedTestResult {
        provider_id: "ookla-cli".to_string(),
        download_mbps: download,
        upload_mbps: upload,
        latency_ms: latency,
        jitter_ms: jitter,
        packet_loss_pct: packet_loss,
        server,
        timestamp: chrono::Utc::now(),
    }
}
