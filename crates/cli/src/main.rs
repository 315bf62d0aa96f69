//! Portaria CLI
//!
//! Terminal front end for the Portaria assistant: ask questions, run
//! semantic searches and read documents from the RAG backend.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, DocumentCommand, LegacySearchCommand, RenderCommand, SearchCommand,
};
use portaria_core::{config::AppConfig, logging, AppResult, LogFormat};
use std::path::PathBuf;

/// Portaria CLI - questions and search over regulatory documents
#[derive(Parser, Debug)]
#[command(name = "portaria")]
#[command(about = "Questions and semantic search over portarias", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the RAG backend
    #[arg(long, global = true, env = "PORTARIA_API_URL")]
    api_url: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PORTARIA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log line format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question and print the answer with its sources
    Ask(AskCommand),

    /// Semantic search over the portarias
    Search(SearchCommand),

    /// Print the full content of a document
    Document(DocumentCommand),

    /// Regex search directly against the legacy document store
    LegacySearch(LegacySearchCommand),

    /// Render markdown from stdin to sanitized HTML
    Render(RenderCommand),

    /// Interactive conversation
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.config.clone(), |key: &str| std::env::var(key).ok())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.api_url,
        cli.log_level,
        cli.log_format,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.log_format, config.no_color)?;

    tracing::info!("Portaria CLI starting");
    tracing::debug!("Backend: {}", config.api_url);
    tracing::debug!("Config file: {:?}", config.config_file);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Document(_) => "document",
        Commands::LegacySearch(_) => "legacy-search",
        Commands::Render(_) => "render",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Document(cmd) => cmd.execute(&config).await,
        Commands::LegacySearch(cmd) => cmd.execute(&config).await,
        Commands::Render(cmd) => cmd.execute().await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
