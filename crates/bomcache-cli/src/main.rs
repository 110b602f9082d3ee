//! bomcache - command-line host for the offline worker.
//!
//! Runs the worker's install / activate / fetch lifecycle against a live
//! origin, keeping the cache buckets on disk so their state can be inspected
//! between runs.

mod commands;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bomcache_core::RequestMode;

#[derive(Parser)]
#[command(name = "bomcache", version, about = "Offline asset cache for the BOM web app")]
struct Cli {
    /// Origin to cache assets from (overrides the config file and BOMCACHE_ORIGIN)
    #[arg(long, global = true)]
    origin: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pre-cache every static asset into the current bucket
    Install,
    /// Delete stale buckets left by previous versions
    Activate,
    /// Install, then activate
    Start,
    /// Dispatch a fetch event through the active worker
    Fetch {
        url: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Navigate)]
        mode: ModeArg,
    },
    /// List cache buckets and their entries
    Status,
    /// Print the default Bom and Item records as JSON
    Defaults,
    /// Save settings to the config file
    Config {
        #[arg(long)]
        cache_dir: Option<std::path::PathBuf>,
        /// Default log filter when RUST_LOG is unset (e.g. info)
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

impl From<ModeArg> for RequestMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Navigate => RequestMode::Navigate,
            ModeArg::SameOrigin => RequestMode::SameOrigin,
            ModeArg::NoCors => RequestMode::NoCors,
            ModeArg::Cors => RequestMode::Cors,
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing(default_level: &str) {
    // RUST_LOG wins over the configured level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = bomcache_core::Config::load()?;

    init_tracing(config.log_level());
    info!("bomcache starting");

    if let Some(ref origin) = cli.origin {
        config.origin = Some(origin.clone());
    }

    match cli.command {
        Command::Install => commands::install(&config).await,
        Command::Activate => commands::activate(&config).await,
        Command::Start => commands::start(&config).await,
        Command::Fetch { url, mode } => commands::fetch(&config, &url, mode.into()).await,
        Command::Status => commands::status(&config).await,
        Command::Defaults => commands::defaults(),
        // Saved from the file plus explicit flags, never environment overrides
        Command::Config { cache_dir, log_level } => {
            commands::save_config(cli.origin, cache_dir, log_level)
        }
    }
}
