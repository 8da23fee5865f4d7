//! Semantic Code Search - index a codebase and query it by meaning
//!
//! Serves `index_codebase`, `semantic_search` and `get_index_status` as
//! line-delimited JSON-RPC over stdio, with one-shot CLI equivalents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod config;
mod core;
mod index;
mod server;

/// Semantic code search over a local codebase
#[derive(Parser)]
#[command(name = "semantic-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Index a codebase and search it by meaning", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory every indexed path must stay inside
    #[arg(long, global = true, env = "SEMANTIC_SEARCH_BASE_DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-RPC requests on stdin/stdout
    Serve,

    /// Index a directory and print a summary
    Index {
        /// Path to index, relative to the base directory
        path: Option<String>,

        /// Force a full rebuild
        #[arg(short, long)]
        force: bool,
    },

    /// Index a directory, then search it
    Search {
        /// Natural language query
        query: String,

        /// Path to index, relative to the base directory
        #[arg(short, long)]
        path: Option<String>,

        /// Maximum results (clamped to 1..=1000)
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Minimum cosine similarity
        #[arg(short, long, allow_negative_numbers = true)]
        threshold: Option<f32>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize configuration file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON-RPC replies
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = config::load_config(cli.config.as_deref())?;
    config.verbose = cli.verbose;

    info!("Semantic Code Search v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let base_dir = resolve_base_dir(cli.base_dir, &config)?;
            cli::serve::run(config, &base_dir).await?;
        }
        Commands::Index { path, force } => {
            let base_dir = resolve_base_dir(cli.base_dir, &config)?;
            cli::index::run(config, &base_dir, path.as_deref(), force).await?;
        }
        Commands::Search { query, path, limit, threshold } => {
            let base_dir = resolve_base_dir(cli.base_dir, &config)?;
            cli::search::run(config, &base_dir, &query, path.as_deref(), limit, threshold).await?;
        }
        Commands::Config { show, init } => {
            if init {
                config::init_config()?;
            } else if show {
                config::show_config(&config)?;
            }
        }
    }

    Ok(())
}

/// Flag or env first, then the config file, then the working directory
fn resolve_base_dir(flag: Option<PathBuf>, config: &config::Config) -> Result<PathBuf> {
    let raw = match flag.or_else(|| config.server.base_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    raw.canonicalize()
        .with_context(|| format!("Invalid base directory: {}", raw.display()))
}
