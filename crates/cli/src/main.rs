//! Ragchat CLI
//!
//! Main entry point for the ragchat tool.
//! Answers questions using only documents retrieved from a private index.

mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand};
use ragchat_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Ragchat - grounded question answering over a private document index
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(about = "Grounded question answering over a private document index", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true, env = "RAGCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Minimum relevance score for a document to ground an answer
    #[arg(long, global = true)]
    min_score: Option<f64>,

    /// Number of candidates requested from the search service
    #[arg(long, global = true)]
    top_k: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API
    Serve(ServeCommand),

    /// Ask a single question and print the answer
    Ask(AskCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration; the --config flag stands in for RAGCHAT_CONFIG
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());
    let config = AppConfig::load_from(|key| {
        if key == "RAGCHAT_CONFIG" {
            config_path.clone()
        } else {
            std::env::var(key).ok()
        }
    })?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.min_score,
        cli.top_k,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    )?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.json_logs)?;

    // Log startup
    tracing::info!("Ragchat starting");
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Generation provider: {}", config.generation.provider);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
