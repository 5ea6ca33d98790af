//! MindMate CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Initialize config directory & default config
//! - `chat`     — Interactive chat or single-message mode
//! - `personas` — List available companions
//! - `topics`   — List advice topics
//! - `doctor`   — Diagnose configuration & endpoint health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mindmate",
    about = "MindMate — persona-driven companion chat for the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with a companion
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Start with this persona (see `mindmate personas`)
        #[arg(short, long)]
        persona: Option<String>,

        /// Upcoming exam date (YYYY-MM-DD) for the countdown context
        #[arg(long, conflicts_with = "mood")]
        exam_date: Option<String>,

        /// Mood check-in: down, flat, okay, or great
        #[arg(long)]
        mood: Option<String>,

        /// Wait for whole replies instead of streaming fragments
        #[arg(long)]
        no_stream: bool,
    },

    /// List available companions
    Personas,

    /// List advice topics
    Topics,

    /// Diagnose configuration and endpoint health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            persona,
            exam_date,
            mood,
            no_stream,
        } => commands::chat::run(message, persona, exam_date, mood, no_stream).await?,
        Commands::Personas => commands::personas::run().await?,
        Commands::Topics => commands::topics::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
