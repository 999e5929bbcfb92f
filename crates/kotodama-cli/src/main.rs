//! Kotodama CLI: entry point.
//!
//! # Commands
//!
//! - `kotodama generate -p PROMPT [...]`: write a post or a thread in a brand voice
//! - `kotodama analyze --username U --file F`: build a target profile from sample posts
//! - `kotodama models [--provider P]`: list known models
//! - `kotodama status`: show configuration and credential status
//! - `kotodama voices ...`: manage brand voices
//! - `kotodama history [--limit N]`: show recent generations

mod analyze;
mod generate;
mod helpers;
mod status;
mod voices;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use kotodama_core::types::{FastMode, Provider, Quality};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Kotodama: brand-voice post generation across several AI vendors
#[derive(Parser)]
#[command(name = "kotodama", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a post or a thread
    Generate(generate::GenerateArgs),

    /// Analyze sample posts and save a target profile
    Analyze {
        /// Account the samples belong to
        #[arg(short, long)]
        username: String,

        /// File with one sample post per line
        #[arg(short, long)]
        file: std::path::PathBuf,

        /// Provider to analyze with (defaults to config)
        #[arg(long)]
        provider: Option<Provider>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List known models
    Models {
        /// Only this provider
        #[arg(long)]
        provider: Option<Provider>,
    },

    /// Show configuration and provider status
    Status,

    /// Manage brand voices
    Voices {
        #[command(subcommand)]
        action: voices::VoicesCommands,
    },

    /// Show recent generations
    History {
        /// Number of records to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

/// `--quality` values.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum QualityArg {
    Opus,
    OpusMax,
}

impl From<QualityArg> for Quality {
    fn from(q: QualityArg) -> Self {
        match q {
            QualityArg::Opus => Quality::Opus,
            QualityArg::OpusMax => Quality::OpusMax,
        }
    }
}

/// Resolve the mutually exclusive speed flags.
pub fn fast_mode_from_flags(fast: bool, ultra: bool, haiku_45: bool) -> FastMode {
    if ultra {
        FastMode::Ultra
    } else if haiku_45 {
        FastMode::Haiku45
    } else if fast {
        FastMode::Fast
    } else {
        FastMode::Off
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            init_logging(args.logs);
            generate::run(args).await
        }
        Commands::Analyze {
            username,
            file,
            provider,
            logs,
        } => {
            init_logging(logs);
            analyze::run(&username, &file, provider).await
        }
        Commands::Models { provider } => {
            status::print_models(provider);
            Ok(())
        }
        Commands::Status => status::run(),
        Commands::Voices { action } => {
            init_logging(false);
            voices::dispatch(action)
        }
        Commands::History { limit } => {
            init_logging(false);
            helpers::print_history(limit)
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kotodama=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
