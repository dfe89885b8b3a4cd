//! Terminal view: indicatif progress bar with the spinner in its message,
//! and a green or red result block.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use nu_ansi_term::Color;

use super::progress::{ProgressModel, COMPLETE};
use super::{Outcome, ProgressView};
use crate::bench::BenchKind;

const SUCCESS: Color = Color::Rgb(0x2c, 0x74, 0x2f);
const FAILURE: Color = Color::Rgb(0xc0, 0x39, 0x2b);

/// Failure record used when an outcome itself cannot be serialized.
fn json_failure(error: &str) -> String {
    serde_json::json!({ "status": "failure", "error": error }).to_string()
}

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colored when stdout is a terminal.
    Auto,
    Plain,
    Json,
}

pub struct TerminalUi {
    mode: OutputMode,
    paint: bool,
    bar: Option<ProgressBar>,
}

impl TerminalUi {
    pub fn new(mode: OutputMode) -> Self {
        let paint = mode == OutputMode::Auto && std::io::stdout().is_terminal();

        #[cfg(windows)]
        let paint = paint && nu_ansi_term::enable_ansi_support().is_ok();

        Self {
            mode,
            paint,
            bar: None,
        }
    }

    fn new_bar(&self) -> ProgressBar {
        let target = if self.mode == OutputMode::Json {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let bar = ProgressBar::with_draw_target(Some(COMPLETE as u64), target);
        let style = ProgressStyle::with_template("{msg}\n[{bar:26.yellow/white}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar
    }

    /// Render `outcome` the way it is printed to stdout.
    pub fn render(&self, outcome: &Outcome) -> String {
        match self.mode {
            OutputMode::Json => serde_json::to_string_pretty(outcome)
                .unwrap_or_else(|e| json_failure(&e.to_string())),
            _ if self.paint => {
                let color = if outcome.is_success() { SUCCESS } else { FAILURE };
                color.paint(outcome.text()).to_string()
            }
            _ => outcome.text(),
        }
    }
}

impl ProgressView for TerminalUi {
    fn start(&mut self, _kind: BenchKind) {
        if let Some(old) = self.bar.take() {
            old.finish_and_clear();
        }
        let bar = self.new_bar();
        bar.set_position(0);
        self.bar = Some(bar);
    }

    fn update(&mut self, model: &ProgressModel) {
        if let Some(bar) = &self.bar {
            bar.set_message(model.message());
            bar.set_position(model.value() as u64);
        }
    }

    fn finish(&mut self, outcome: &Outcome) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        println!("{}", self.render(outcome));
    }
}
