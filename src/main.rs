use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use benchpack::bench::BenchKind;
use benchpack::config::{BenchConfig, LoggingConfig, ProviderChoice};
use benchpack::runner::menu;
use benchpack::runner::ui::{OutputMode, TerminalUi};

#[derive(Parser)]
#[command(
    name = "benchpack",
    about = "Quick performance probes: network speed, video transcode, disk I/O and OpenGL FPS",
    version,
    long_about = None
)]
struct Cli {
    /// Config file (default: $BENCHPACK_CONFIG, then ./benchpack.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results without colors
    #[arg(long, global = true)]
    plain: bool,

    /// JSON output for machine parsing
    #[arg(long, global = true, conflicts_with = "plain")]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Internet speed test: ping, download, upload
    Speed {
        /// Provider: auto, ookla or cloudflare
        #[arg(long)]
        provider: Option<ProviderChoice>,
    },

    /// Download a clip and time decoding + re-encoding every frame
    Video {
        /// Source clip URL
        #[arg(long)]
        url: Option<String>,

        /// Delete the transcoded file afterwards
        #[arg(long)]
        discard_output: bool,
    },

    /// Sequential write/read throughput of a scratch file
    Disk {
        /// Directory for the scratch file
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Scratch file size in MB
        #[arg(long)]
        size_mb: Option<u64>,
    },

    /// Spinning-cube frame rate on an off-screen GLES context
    Render {
        /// Measurement window in seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Run every benchmark in turn
    All,

    /// List speed test providers and whether they are usable here
    Providers,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BenchConfig::resolve(cli.config.as_deref())?;
    init_tracing(&config.logging);

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.plain {
        OutputMode::Plain
    } else {
        OutputMode::Auto
    };
    let mut ui = TerminalUi::new(mode);

    let kinds: Vec<BenchKind> = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            menu::run_menu(stdin, &config, &mut ui).await?;
            return Ok(());
        }
        Commands::Providers => {
            println!("{:<12} | {:<26} | {:<9} | Notes", "Id", "Name", "Available");
            println!("{:-<12}-|-{:-<26}-|-{:-<9}-|-{:-<30}", "", "", "", "");
            for p in benchpack::throughput::provider::registry() {
                let meta = p.meta();
                let is_available = p.is_available();
                let available = if is_available { "yes" } else { "no" };
                println!(
                    "{:<12} | {:<26} | {:<9} | {}",
                    meta.id, meta.display_name, available, meta.description
                );
                if !is_available {
                    println!("{:<12} | {:<26} | {:<9} |   -> {}", "", "", "", meta.install_hint);
                }
                if let Some(note) = meta.licensing_note {
                    println!("{:<12} | {:<26} | {:<9} |   -> {}", "", "", "", note);
                }
            }
            return Ok(());
        }
        Commands::Speed { provider } => {
            if let Some(p) = provider {
                config.network.provider = p;
            }
            vec![BenchKind::Speed]
        }
        Commands::Video {
            url,
            discard_output,
        } => {
            if let Some(url) = url {
                config.video.url = url;
            }
            if discard_output {
                config.video.keep_output = false;
            }
            vec![BenchKind::Video]
        }
        Commands::Disk { dir, size_mb } => {
            if let Some(dir) = dir {
                config.disk.directory = dir;
            }
            if let Some(size) = size_mb {
                config.disk.size_mb = size;
            }
            vec![BenchKind::Disk]
        }
        Commands::Render { duration } => {
            if let Some(d) = duration {
                config.render.duration_secs = d;
            }
            vec![BenchKind::Render]
        }
        Commands::All => BenchKind::ALL.to_vec(),
    };

    let outcomes = benchpack::run_sequence(&kinds, &config, &mut ui).await;
    benchpack::check_outcomes(&outcomes)
}
