//! sumika CLI
//!
//! Command-line front end for the regional living-information assistant:
//! ask grounded questions, inspect and export conversation history, list
//! prompt templates, and check the document index.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, HistoryCommand, PropertyCommand, StatsCommand, TemplateCommand};
use sumika_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Regional living-information assistant over an ingested document index
#[derive(Parser, Debug)]
#[command(name = "sumika")]
#[command(about = "Ask questions about an area: properties, schools, transit, safety", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (templates, history, config)
    #[arg(short, long, global = true, env = "SUMIKA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SUMIKA_CONFIG")]
    config: Option<PathBuf>,

    /// Generation provider (openai, mock)
    #[arg(short, long, global = true, env = "SUMIKA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "SUMIKA_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about the area
    Ask(AskCommand),

    /// Inspect, export or clear conversation history
    History(HistoryCommand),

    /// List and show property records
    Property(PropertyCommand),

    /// List and show prompt templates
    Template(TemplateCommand),

    /// Show document index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?.with_overrides(
        cli.data_dir,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;
    config.ensure_data_dir()?;

    tracing::debug!(data_dir = ?config.data_dir, provider = %config.generation.provider, "sumika starting");

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::History(_) => "history",
        Commands::Property(_) => "property",
        Commands::Template(_) => "template",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::History(cmd) => cmd.execute(&config),
        Commands::Property(cmd) => cmd.execute(&config).await,
        Commands::Template(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config).await,
    };

    if let Err(ref e) = result {
        tracing::error!("Command failed: {}", e);
        // The user-facing channel gets the safe message; detail stays in logs
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
