//! websearch CLI, the main entry point.
//!
//! Commands:
//! - `run`    Run one chat turn through the pipeline
//! - `test`   Search a sample text and print the extracted result
//! - `cache`  Clear the result cache or show its statistics
//! - `init`   Write the default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "websearch",
    about = "Web search context injection for chat prompts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.websearch/config.toml
    #[arg(short, long, global = true, env = "WEBSEARCH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a JSON chat history and print the injected text
    Run {
        /// Path to a JSON array of `{ "is_user", "is_system", "text" }` turns (`mes` also accepted)
        #[arg(long)]
        chat: PathBuf,

        /// Run even if `websearch.enabled` is false in the config
        #[arg(long)]
        enable: bool,
    },

    /// Search a sample text directly and print the extracted result
    Test {
        /// Text to search for
        text: String,
    },

    /// Manage the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached result
    Clear,

    /// Show cache backend and entry count
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run { chat, enable } => commands::run::run(config_path, &chat, enable).await?,
        Commands::Test { text } => commands::test::run(config_path, &text).await?,
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::cache::clear(config_path).await?,
            CacheAction::Stats => commands::cache::stats(config_path).await?,
        },
        Commands::Init { force } => commands::init::run(config_path, force).await?,
    }

    Ok(())
}
