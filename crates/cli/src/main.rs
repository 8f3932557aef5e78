//! Colloquy CLI: the main entry point.
//!
//! Commands:
//! - `chat`: chat in a new or stored conversation
//! - `title`: regenerate a conversation's title
//! - `tools`: list the tools the assistant can call
//! - `conversations`: list stored conversations
//! - `show`: print one stored conversation
//! - `config`: show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "colloquy",
    about = "Colloquy: a conversational assistant with live-data tools",
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
    /// Chat with the assistant
    Chat {
        /// Continue a stored conversation instead of starting a new one
        #[arg(short, long)]
        conversation: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Generate and store a new title for a conversation
    Title {
        /// Conversation id
        id: String,
    },

    /// List registered tools
    Tools,

    /// List stored conversations
    Conversations,

    /// Print a stored conversation's messages
    Show {
        /// Conversation id
        id: String,
    },

    /// Show the effective configuration (secrets redacted)
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            conversation,
            message,
        } => commands::chat::run(conversation, message).await?,
        Commands::Title { id } => commands::title::run(id).await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Conversations => commands::conversations::run().await?,
        Commands::Show { id } => commands::show::run(id).await?,
        Commands::Config => commands::config_cmd::run()?,
    }

    Ok(())
}
