//! Drives one benchmark on a background task while a view shows a spinner
//! and a progress bar, then hands the view the classified outcome.

pub mod menu;
pub mod progress;
pub mod ui;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::bench::{BenchError, BenchKind, BenchReport, Benchmark};
use progress::ProgressModel;

/// Interval between spinner/progress updates.
pub const TICK: Duration = Duration::from_millis(100);

/// Result of a run as presented to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { report: BenchReport },
    Failure { kind: BenchKind, error: String },
}

impl Outcome {
    pub fn kind(&self) -> BenchKind {
        match self {
            Outcome::Success { report } => report.kind,
            Outcome::Failure { kind, .. } => *kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Text for the result area.
    pub fn text(&self) -> String {
        match self {
            Outcome::Success { report } => report.summary.clone(),
            Outcome::Failure { error, .. } => format!("Error: {error}"),
        }
    }
}

/// Presentation of a running benchmark.
pub trait ProgressView {
    /// Clear previous output and show an empty progress bar.
    fn start(&mut self, kind: BenchKind);

    fn update(&mut self, model: &ProgressModel);

    fn finish(&mut self, outcome: &Outcome);
}

/// Run `bench` to completion, ticking `view` every [`TICK`].
pub async fn run_with_progress(bench: Box<dyn Benchmark>, view: &mut dyn ProgressView) -> Outcome {
    let kind = bench.kind();
    let bench: Arc<dyn Benchmark> = Arc::from(bench);

    view.start(kind);
    let mut model = ProgressModel::new(kind.busy_label());
    info!(%kind, "benchmark started");

    let mut handle = tokio::spawn(async move { bench.run().await });
    let mut ticker = tokio::time::interval(TICK);

    let joined = loop {
        tokio::select! {
            res = &mut handle => break res,
            _ = ticker.tick() => {
                view.update(&model);
                model.tick();
            }
        }
    };

    model.complete();
    view.update(&model);

    let outcome = match joined {
        Ok(Ok(report)) => Outcome::Success { report },
        Ok(Err(e)) => Outcome::Failure {
            kind,
            error: e.to_string(),
        },
        Err(e) => Outcome::Failure {
            kind,
            error: BenchError::Join(e.to_string()).to_string(),
        },
    };

    if outcome.is_success() {
        info!(%kind, "benchmark succeeded");
    } else {
        warn!(%kind, text = %outcome.text(), "benchmark failed");
    }

    view.finish(&outcome);
    outcome
}
