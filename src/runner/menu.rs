//! Interactive menu: pick a probe, watch it run, pick again or quit.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{run_with_progress, Outcome, ProgressView};
use crate::bench::{self, BenchKind};
use crate::config::BenchConfig;

pub const TITLE: &str = "Benchmark Pack";
pub const PROMPT: &str = "Choose a benchmark to run:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(BenchKind),
    Quit,
}

pub fn menu_text() -> String {
    let mut text = format!("\n{TITLE}\n{PROMPT}\n");
    for (i, kind) in BenchKind::ALL.iter().enumerate() {
        text.push_str(&format!("  {}) {}\n", i + 1, kind.display_name()));
    }
    text.push_str("  q) Quit\n> ");
    text
}

/// Accepts the entry number, the probe name, or `q`/`quit`/`exit`.
pub fn parse_choice(input: &str) -> Option<MenuChoice> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "q" | "quit" | "exit" => return Some(MenuChoice::Quit),
        "" => return None,
        _ => {}
    }
    if let Ok(n) = input.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| BenchKind::ALL.get(i))
            .map(|k| MenuChoice::Run(*k));
    }
    BenchKind::ALL
        .iter()
        .find(|k| k.to_string() == input)
        .map(|k| MenuChoice::Run(*k))
}

/// Loop until the user quits or input ends. Returns every outcome shown.
pub async fn run_menu<R>(
    input: R,
    config: &BenchConfig,
    view: &mut dyn ProgressView,
) -> Result<Vec<Outcome>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut outcomes = Vec::new();

    loop {
        print!("{}", menu_text());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_choice(&line) {
            Some(MenuChoice::Quit) => break,
            Some(MenuChoice::Run(kind)) => {
                let outcome = run_with_progress(bench::build(kind, config), view).await;
                outcomes.push(outcome);
            }
            None => println!("Unknown choice: {}", line.trim()),
        }
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::progress::ProgressModel;

    #[test]
    fn test_menu_lists_every_probe() {
        let text = menu_text();
        assert!(text.contains(TITLE));
        assert!(text.contains("1) Speedtest"));
        assert!(text.contains("2) Video benchmark"));
        assert!(text.contains("3) Disk (write/read)"));
        assert!(text.contains("4) OpenGL FPS"));
        assert!(text.contains("q) Quit"));
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1"), Some(MenuChoice::Run(BenchKind::Speed)));
        assert_eq!(parse_choice(" 4 \n"), Some(MenuChoice::Run(BenchKind::Render)));
        assert_eq!(parse_choice("disk"), Some(MenuChoice::Run(BenchKind::Disk)));
        assert_eq!(parse_choice("Q"), Some(MenuChoice::Quit));
        assert_eq!(parse_choice("0"), None);
        assert_eq!(parse_choice("5"), None);
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("gpu"), None);
    }

    struct Silent;

    impl ProgressView for Silent {
        fn start(&mut self, _kind: BenchKind) {}
        fn update(&mut self, _model: &ProgressModel) {}
        fn finish(&mut self, _outcome: &Outcome) {}
    }

    #[tokio::test]
    async fn test_menu_runs_disk_then_quits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BenchConfig::default();
        config.disk.directory = dir.path().to_path_buf();
        config.disk.size_mb = 1;

        let input: &[u8] = b"nonsense\n3\nq\n4\n";
        let outcomes = run_menu(input, &config, &mut Silent).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind(), BenchKind::Disk);
        assert!(outcomes[0].is_success(), "{}", outcomes[0].text());
    }

    #[tokio::test]
    async fn test_menu_ends_on_eof() {
        let input: &[u8] = b"";
        let outcomes = run_menu(input, &BenchConfig::default(), &mut Silent)
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }
}
