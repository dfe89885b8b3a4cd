//! Video decode/re-encode throughput probe.

pub mod fetch;
pub mod transcode;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::bench::{rate, BenchKind, BenchReport, BenchResult, Benchmark};
use crate::config::VideoConfig;

/// Credit line for the default clip.
pub const ATTRIBUTION: &str = "Video by Rain MeditateHub from Pixabay";

pub fn format_summary(stats: &transcode::TranscodeStats) -> String {
    format!(
        "Processed {} frames in {:.2} s\nAverage FPS: {:.2}\n{}",
        stats.frames,
        stats.elapsed_secs,
        rate(stats.frames as f64, stats.elapsed_secs),
        ATTRIBUTION
    )
}

pub struct VideoBench {
    config: VideoConfig,
}

impl VideoBench {
    pub fn new(config: VideoConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Benchmark for VideoBench {
    fn kind(&self) -> BenchKind {
        BenchKind::Video
    }

    async fn run(&self) -> BenchResult<BenchReport> {
        let cfg = &self.config;
        fetch::ensure_source(&cfg.url, &cfg.source_path).await?;

        let info = transcode::probe(&cfg.ffprobe, &cfg.source_path).await?;
        info!(
            width = info.width,
            height = info.height,
            fps = info.fps,
            "video source opened"
        );

        let stats = transcode::transcode(&cfg.ffmpeg, &cfg.source_path, &cfg.output_path).await?;
        let fps = rate(stats.frames as f64, stats.elapsed_secs);
        info!(frames = stats.frames, elapsed_secs = stats.elapsed_secs, fps, "video benchmark finished");

        if !cfg.keep_output {
            if let Err(e) = tokio::fs::remove_file(&cfg.output_path).await {
                warn!(path = %cfg.output_path.display(), error = %e, "failed to remove transcoded output");
            }
        }

        Ok(
            BenchReport::new(BenchKind::Video, format_summary(&stats), stats.elapsed_secs)
                .with_metric("frames", stats.frames as f64)
                .with_metric("fps", fps)
                .with_metric("source_width", info.width as f64)
                .with_metric("source_height", info.height as f64)
                .with_metric("source_fps", info.fps),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::transcode::TranscodeStats;
    use crate::bench::BenchError;

    #[test]
    fn test_format_summary() {
        let summary = format_summary(&TranscodeStats {
            frames: 300,
            elapsed_secs: 2.5,
        });
        assert_eq!(
            summary,
            "Processed 300 frames in 2.50 s\nAverage FPS: 120.00\nVideo by Rain MeditateHub from Pixabay"
        );
    }

    #[test]
    fn test_format_summary_zero_elapsed() {
        let summary = format_summary(&TranscodeStats {
            frames: 0,
            elapsed_secs: 0.0,
        });
        assert!(summary.contains("Average FPS: 0.00"));
    }

    fn bench_with_ffprobe(dir: &std::path::Path, ffprobe: &str) -> VideoBench {
        let source = dir.join("garbage.mp4");
        std::fs::write(&source, b"definitely not a video").unwrap();
        VideoBench::new(VideoConfig {
            source_path: source,
            output_path: dir.join("out.avi"),
            ffprobe: ffprobe.to_string(),
            ..VideoConfig::default()
        })
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench_with_ffprobe(dir.path(), "benchpack-no-such-ffprobe");
        assert!(matches!(bench.run().await, Err(BenchError::ToolMissing { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ffprobe_failure_means_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let bench = bench_with_ffprobe(dir.path(), "false");
        let err = bench.run().await.unwrap_err();
        assert!(matches!(err, BenchError::VideoOpen { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_source_without_video_stream_means_cannot_open() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffprobe");
        std::fs::write(&script, "#!/bin/sh\necho '{\"streams\":[]}'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bench = bench_with_ffprobe(dir.path(), script.to_str().unwrap());
        let err = bench.run().await.unwrap_err();
        assert!(matches!(err, BenchError::VideoOpen { .. }), "{err}");
        assert!(err.to_string().contains("garbage.mp4"));
    }
}
