//! 3-D frame-rate probe: a spinning wire-frame cube rendered off-screen for
//! a fixed wall-clock duration.

pub mod cube;
pub mod gles;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::info;

use crate::bench::{rate, BenchError, BenchKind, BenchReport, BenchResult, Benchmark};
use crate::config::RenderConfig;
use cube::Mat4;

/// Something that can draw one complete frame of the cube.
pub trait FrameSink {
    fn draw_frame(&mut self, mvp: &Mat4) -> BenchResult<()>;
}

/// Draw frames until `duration` has elapsed; returns the frame count.
pub fn run_frames(
    sink: &mut dyn FrameSink,
    duration: Duration,
    width: u32,
    height: u32,
) -> BenchResult<u64> {
    let start = Instant::now();
    let mut frames = 0u64;
    while start.elapsed() < duration {
        sink.draw_frame(&cube::frame_mvp(frames, width, height))?;
        frames += 1;
    }
    Ok(frames)
}

/// Wall-clock length of the loop; zero, negative, non-finite and
/// unrepresentable values are rejected.
pub fn loop_duration(secs: f64) -> BenchResult<Duration> {
    let duration = Duration::try_from_secs_f64(secs)
        .map_err(|e| BenchError::Render(format!("invalid duration {secs}: {e}")))?;
    if duration.is_zero() {
        return Err(BenchError::Render(format!("invalid duration: {secs}")));
    }
    Ok(duration)
}

pub fn format_summary(duration_secs: f64, avg_fps: f64) -> String {
    format!("Average FPS over {} seconds: {:.2}", duration_secs, avg_fps)
}

pub struct RenderBench {
    config: RenderConfig,
}

impl RenderBench {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Benchmark for RenderBench {
    fn kind(&self) -> BenchKind {
        BenchKind::Render
    }

    async fn run(&self) -> BenchResult<BenchReport> {
        let cfg = self.config.clone();
        let duration = loop_duration(cfg.duration_secs)?;

        // GL contexts are bound to the thread that made them current.
        let frames = tokio::task::spawn_blocking(move || {
            let mut backend = gles::GlesBackend::new(cfg.width, cfg.height)?;
            run_frames(&mut backend, duration, cfg.width, cfg.height)
        })
        .await
        .map_err(|e| BenchError::Join(e.to_string()))??;

        let avg_fps = rate(frames as f64, self.config.duration_secs);
        info!(frames, avg_fps, "render benchmark finished");

        Ok(BenchReport::new(
            BenchKind::Render,
            format_summary(self.config.duration_secs, avg_fps),
            self.config.duration_secs,
        )
        .with_metric("frames", frames as f64)
        .with_metric("avg_fps", avg_fps))
    }
}
