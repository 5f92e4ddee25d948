//! Mastermind CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: write a default config file
//! - `ask`: answer a single rules question
//! - `chat`: interactive judge session
//! - `card`: show a card's Oracle text and rulings
//! - `doctor`: diagnose configuration and connectivity

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mastermind",
    about = "Mastermind — a grounded rules judge for Magic: The Gathering",
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

    /// Ask a single rules question
    Ask {
        /// The question
        question: String,

        /// Card to ground the answer in (exact English name, repeatable)
        #[arg(short, long = "card")]
        cards: Vec<String>,
    },

    /// Start an interactive judge session
    Chat {
        /// Cards to select before the first question (repeatable)
        #[arg(short, long = "card")]
        cards: Vec<String>,
    },

    /// Look up a card and its official rulings
    Card {
        /// Exact English card name
        name: String,

        /// List name suggestions instead of an exact lookup
        #[arg(short, long)]
        suggest: bool,
    },

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with a streamed answer
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { question, cards } => commands::ask::run(question, cards).await?,
        Commands::Chat { cards } => commands::chat::run(cards).await?,
        Commands::Card { name, suggest } => commands::card::run(name, suggest).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
