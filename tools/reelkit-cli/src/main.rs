//! ReelKit CLI: command-line interface for recording sessions.
//!
//! Usage:
//!   reelkit record [OPTIONS]   Run a recording session
//!   reelkit check              Check encoder format support

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reelkit",
    about = "Screen recording session engine",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recording session against the simulated capture pipeline
    Record {
        /// Audio sources to include: system, microphone, both, or none
        #[arg(long, default_value = "system")]
        audio: String,

        /// Enable webcam capture with the overlay preview
        #[arg(long)]
        webcam: bool,

        /// Stop automatically after this many seconds (Ctrl+C otherwise)
        #[arg(long)]
        duration: Option<u64>,

        /// Pause this many seconds into the recording
        #[arg(long, requires = "pause_for")]
        pause_after: Option<u64>,

        /// How long to stay paused
        #[arg(long, requires = "pause_after")]
        pause_for: Option<u64>,

        /// Output file for the finished artifact
        #[arg(short, long, default_value = "recording.webm")]
        output: PathBuf,
    },

    /// Check encoder format support
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    reelkit_common::logging::init_logging(&reelkit_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Record {
            audio,
            webcam,
            duration,
            pause_after,
            pause_for,
            output,
        } => commands::record::run(audio, webcam, duration, pause_after, pause_for, output).await,
        Commands::Check => commands::check::run(),
    }
}
