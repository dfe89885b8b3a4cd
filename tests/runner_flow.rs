//! Runner behavior observed through a recording view.

use std::time::Duration;

use async_trait::async_trait;
use benchpack::bench::{BenchError, BenchKind, BenchReport, BenchResult, Benchmark};
use benchpack::config::{BenchConfig, DiskConfig};
use benchpack::runner::progress::ProgressModel;
use benchpack::runner::{self, Outcome, ProgressView};

struct Slow {
    fail: bool,
}

#[async_trait]
impl Benchmark for Slow {
    fn kind(&self) -> BenchKind {
        BenchKind::Speed
    }

    async fn run(&self) -> BenchResult<BenchReport> {
        tokio::time::sleep(Duration::from_millis(450)).await;
        if self.fail {
            Err(BenchError::NoProvider)
        } else {
            Ok(BenchReport::new(BenchKind::Speed, "Ping: 1.00 ms".into(), 0.45).with_metric("ping_ms", 1.0))
        }
    }
}

#[derive(Default)]
struct Recorder {
    started: Vec<BenchKind>,
    values: Vec<u8>,
    messages: Vec<String>,
    finished: Vec<bool>,
}

impl ProgressView for Recorder {
    fn start(&mut self, kind: BenchKind) {
        self.started.push(kind);
    }

    fn update(&mut self, model: &ProgressModel) {
        self.values.push(model.value());
        self.messages.push(model.message());
    }

    fn finish(&mut self, outcome: &Outcome) {
        self.finished.push(outcome.is_success());
    }
}

#[tokio::test]
async fn test_progress_climbs_then_completes() {
    let mut view = Recorder::default();
    let outcome = runner::run_with_progress(Box::new(Slow { fail: false }), &mut view).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.text(), "Ping: 1.00 ms");
    assert_eq!(view.started, vec![BenchKind::Speed]);
    assert_eq!(view.finished, vec![true]);

    // Several ticks elapse during the 450 ms run.
    assert!(view.values.len() >= 3);
    assert!(view.values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(view.values.last().copied(), Some(100));
    assert!(view.values[..view.values.len() - 1].iter().all(|v| *v <= 90));
    assert!(view.messages[0].starts_with("Speed test running... please wait "));
}

#[tokio::test]
async fn test_failure_still_reaches_full_progress() {
    let mut view = Recorder::default();
    let outcome = runner::run_with_progress(Box::new(Slow { fail: true }), &mut view).await;

    assert!(!outcome.is_success());
    assert!(outcome.text().starts_with("Error: "));
    assert_eq!(view.values.last().copied(), Some(100));
    assert_eq!(view.finished, vec![false]);
}

#[tokio::test]
async fn test_sequence_continues_after_failure() {
    let scratch = tempfile::tempdir().unwrap();
    let missing = scratch.path().join("does-not-exist");
    let config = BenchConfig {
        disk: DiskConfig {
            directory: missing,
            size_mb: 1,
            ..DiskConfig::default()
        },
        ..BenchConfig::default()
    };

    let mut view = Recorder::default();
    let kinds = [BenchKind::Disk, BenchKind::Disk];
    let outcomes = benchpack::run_sequence(&kinds, &config, &mut view).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(view.started.len(), 2);
    assert!(outcomes.iter().all(|o| !o.is_success()));

    let err = benchpack::check_outcomes(&outcomes).unwrap_err();
    assert!(err.to_string().contains("disk"));
}

#[test]
fn test_release_profile_unwinds() {
    // A panicking probe is only reported as a failure if panics unwind.
    let manifest = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml")).unwrap();
    let manifest: toml::Value = toml::from_str(&manifest).unwrap();
    let panic = manifest
        .get("profile")
        .and_then(|p| p.get("release"))
        .and_then(|r| r.get("panic"))
        .and_then(|p| p.as_str());
    assert_ne!(panic, Some("abort"));
}
