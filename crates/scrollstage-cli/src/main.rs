use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scrollstage_core::{AppConfig, SequenceDirection};

mod commands;

#[derive(Parser)]
#[command(name = "scrollstage")]
#[command(author, version, about = "Scroll progress smoothing and staged menu animation engine")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive terminal demo
    Run,
    /// Trace the smoothed progress for one scroll position
    Progress {
        /// Total height of the document
        #[arg(long)]
        document_height: f64,
        /// Height of the visible viewport
        #[arg(long)]
        viewport_height: f64,
        /// Scroll offset to jump to
        #[arg(long)]
        offset: f64,
        /// Maximum number of frames to simulate
        #[arg(long, default_value_t = 600)]
        frames: u32,
        /// Print one sample every N frames (crossings are always printed)
        #[arg(long, default_value_t = 30)]
        every: u32,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Run on the wall clock instead of simulated time
        #[arg(long)]
        realtime: bool,
    },
    /// Print the timeline of one open or close run
    Sequence {
        /// Number of stages (defaults to the configured count)
        #[arg(long)]
        stages: Option<usize>,
        #[arg(long, value_enum, default_value_t = DirectionArg::Opening)]
        direction: DirectionArg,
        /// Use the docked timing profile
        #[arg(long)]
        docked: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Only print the config file location
        #[arg(long)]
        path: bool,
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Opening,
    Closing,
}

impl From<DirectionArg> for SequenceDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Opening => SequenceDirection::Opening,
            DirectionArg::Closing => SequenceDirection::Closing,
        }
    }
}

/// Install the global subscriber
///
/// The TUI owns the terminal, so in that mode everything goes to a file in
/// the data directory; the returned guard must outlive the program.
fn init_tracing(config: &AppConfig, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if to_file {
        let log_path = config.log_path();
        let log_dir = config.data_dir();
        std::fs::create_dir_all(&log_dir)?;
        let file_name = log_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scrollstage.log".to_string());

        let appender = tracing_appender::rolling::never(&log_dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_target(false),
            )
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    let interactive = matches!(cli.command, Some(Commands::Run) | None);
    let _guard = init_tracing(&config, interactive)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Progress {
            document_height,
            viewport_height,
            offset,
            frames,
            every,
            json,
            realtime,
        }) => {
            let request = commands::progress::ProgressRequest {
                document_height,
                viewport_height,
                offset,
                frames,
                every,
                json,
            };
            if realtime {
                commands::progress::run_realtime(&config, request).await
            } else {
                commands::progress::run(&config, request)
            }
        }
        Some(Commands::Sequence {
            stages,
            direction,
            docked,
            json,
        }) => commands::sequence::run(&config, stages, direction.into(), docked, json),
        Some(Commands::Config { path, save }) => commands::config::run(&config, path, save),
    }
}
