//! benchpack -- quick desktop performance probes.
//!
//! Four independent benchmarks (internet speed, video transcode, disk
//! write/read, GL frame rate) behind one runner that shows a spinner and a
//! progress bar while a probe works in the background.

pub mod bench;
pub mod config;
pub mod render;
pub mod runner;
pub mod system;
pub mod throughput;
pub mod video;

use anyhow::Result;

use bench::BenchKind;
use config::BenchConfig;
use runner::{Outcome, ProgressView};

/// Run the given probes one after another. Every probe gets its turn even
/// if an earlier one failed.
pub async fn run_sequence(
    kinds: &[BenchKind],
    config: &BenchConfig,
    view: &mut dyn ProgressView,
) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        tracing::info!(%kind, "running benchmark");
        outcomes.push(runner::run_with_progress(bench::build(kind, config), view).await);
    }
    outcomes
}

/// Turn a set of outcomes into the process result.
pub fn check_outcomes(outcomes: &[Outcome]) -> Result<()> {
    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.kind().to_string())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("benchmark(s) failed: {}", failed.join(", "))
    }
}
