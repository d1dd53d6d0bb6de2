//! emacs-tracker CLI - Records Emacs interaction snapshots.

use clap::{Parser, Subcommand};
use emacs_tracker::cli;
use emacs_tracker::config::load_config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emacs-tracker")]
#[command(author, version, about = "Records Emacs interaction snapshots", long_about = None)]
struct Cli {
    /// Config file (defaults to `EMACS_TRACKER_CONFIG` or the storage directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emacs server socket, overriding the configured one.
    #[arg(long, global = true)]
    socket: Option<String>,

    /// Log at debug level.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve tool calls as line-delimited JSON on stdin/stdout.
    Serve,

    /// Take one snapshot and print it.
    Snapshot,

    /// Check the connection to the Emacs server.
    Status,

    /// List persisted session records.
    List {
        /// Maximum number of records to show. Defaults to 20.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Remove the persisted session log.
    Clean,
}

/// Log to stderr; stdout carries tool replies.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> emacs_tracker::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let socket = cli.socket.as_deref();

    match cli.command {
        Commands::Serve => cli::serve::run(&config, socket).await,
        Commands::Snapshot => cli::snapshot::run(&config, socket).await,
        Commands::Status => cli::status::run(&config, socket).await,
        Commands::List { limit } => cli::list::run(&config, limit),
        Commands::Clean => cli::clean::run(&config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("emacs-tracker: error: {e}");
            ExitCode::FAILURE
        }
    }
}
