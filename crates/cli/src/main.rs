//! Operator front end for the local ingestion state.
//!
//! Subcommands work against the cursor and artifact stores named in the
//! configuration file; none of them touch the remote source.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magpie_core::{
    load_config, normalize, validate_config, ArtifactTracker, Config, CursorTracker,
};

#[derive(Parser, Debug)]
#[command(name = "magpie", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Falls back to the MAGPIE_CONFIG
    /// environment variable, then to ./config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show tracker statistics.
    Stats,
    /// Remove tracker records whose file is missing on disk.
    Reconcile,
    /// Manage the message blacklist.
    Blacklist {
        #[command(subcommand)]
        command: BlacklistCommands,
    },
    /// Normalize a track name and print the result.
    Normalize {
        /// Raw name, e.g. a filename stem.
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum BlacklistCommands {
    /// Add a message id to the blacklist.
    Add {
        message_id: i64,
        /// Free-form note kept for this session's logs.
        #[arg(long, default_value = "operator request")]
        reason: String,
    },
    /// Remove a message id from the blacklist.
    Remove { message_id: i64 },
}

fn main() {
    if let Err(e) = run() {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Normalization needs no state at all.
    if let Commands::Normalize { name } = &cli.command {
        println!("{}", normalize(name));
        return Ok(());
    }

    let config = load(&cli)?;
    let tracker = ArtifactTracker::open(
        &config.store.artifact_path,
        config.download.hash_algorithm,
    );

    match cli.command {
        Commands::Stats => {
            let cursor = CursorTracker::open(&config.store.cursor_path);
            let stats = tracker.statistics();
            println!("Downloaded files:  {}", stats.downloaded_files);
            println!("Blacklisted files: {}", stats.blacklisted_files);
            println!("Processed ids:     {}", cursor.processed_count());
            println!(
                "Artifact store:    {} ({} bytes{})",
                stats.store_path.display(),
                stats.store_size_bytes,
                if stats.store_exists { "" } else { ", missing" }
            );
            println!("Cursor store:      {}", cursor.store_path().display());
        }
        Commands::Reconcile => {
            let removed = tracker.reconcile();
            println!("Removed {removed} stale records");
        }
        Commands::Blacklist { command } => match command {
            BlacklistCommands::Add { message_id, reason } => {
                tracker.blacklist(message_id, reason);
                println!("Message {message_id} blacklisted");
            }
            BlacklistCommands::Remove { message_id } => {
                tracker.unblacklist(message_id);
                println!("Message {message_id} removed from blacklist");
            }
        },
        Commands::Normalize { .. } => unreachable!(),
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("MAGPIE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config =
        load_config(&path).with_context(|| format!("Failed to load config from {path:?}"))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}
