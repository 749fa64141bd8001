//! chiptone - sound effect and melody player
//!
//! Hosts the audio service the way a game does: restores settings on the
//! ready signal, triggers sounds, and drives the clock with a frame loop.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use config::PlayerConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chiptone sound effects and melodies", long_about = None)]
pub struct Args {
    /// Player configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted audio settings
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// Record tones instead of playing them, and run without real-time waits
    #[arg(long)]
    headless: bool,

    /// Write played tones as JSONL (requires --headless)
    #[arg(long)]
    event_log: Option<PathBuf>,

    /// How long to keep the frame loop running after the command
    #[arg(long, default_value_t = 1000)]
    duration_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List registered sound names
    List,
    /// Play a registered sound
    Play {
        name: String,
        #[arg(long, default_value_t = 1.0)]
        volume: f32,
        #[arg(long, default_value_t = 1.0)]
        pitch: f32,
    },
    /// Loop a melody of frequencies in Hz (0 for rests)
    Melody {
        #[arg(required = true, allow_negative_numbers = true)]
        notes: Vec<f32>,
        /// Milliseconds per step (defaults to the configured tempo)
        #[arg(long)]
        tempo_ms: Option<u32>,
    },
    /// Line-clear effect for the falling-block game
    LineClear { count: u32 },
    /// Tile-merge effect for the sliding-tile game
    Merge { value: u32 },
    /// Set a bus volume and persist it
    Volume { bus: BusArg, value: f32 },
    /// Flip the enabled setting and persist it
    Toggle,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusArg {
    Master,
    Sfx,
    Music,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting chiptone v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PlayerConfig::load_from_path(path),
        None => PlayerConfig::load(),
    };
    commands::run(&args, config)
}
