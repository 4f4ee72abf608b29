//! strata CLI — the main entry point.
//!
//! Commands:
//! - `compose`    — Resolve all layers and print the layered bindings
//! - `categories` — Evaluate the categorization rules for a node
//! - `check`      — Validate a composer configuration
//! - `init`       — Print the default configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "strata",
    about = "strata — layered configuration composition",
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

#[derive(clap::Args)]
pub(crate) struct EnvArgs {
    /// Path to the configuration (defaults to <confdir>/compose.toml)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Configuration directory (holds compose.toml, hiera.toml, bindings/)
    #[arg(short, long, default_value = "/etc/strata")]
    confdir: PathBuf,

    /// Directory whose subdirectories are the visible modules
    #[arg(short, long)]
    modules: Option<PathBuf>,

    /// The node to compose for
    #[arg(short, long, env = "STRATA_NODE")]
    node: String,

    /// JSON file with node facts
    #[arg(short, long)]
    facts: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve all layers and print the layered bindings as JSON
    Compose {
        #[command(flatten)]
        env: EnvArgs,
    },

    /// Evaluate the categorization rules for a node
    Categories {
        #[command(flatten)]
        env: EnvArgs,
    },

    /// Validate a composer configuration file
    Check {
        /// Path to the configuration (defaults to <confdir>/compose.toml)
        #[arg(short = 'C', long)]
        config: Option<PathBuf>,

        /// Configuration directory
        #[arg(short, long, default_value = "/etc/strata")]
        confdir: PathBuf,
    },

    /// Print the default configuration as TOML
    Init,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
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
        Commands::Compose { env } => commands::compose::run(env)?,
        Commands::Categories { env } => commands::categories::run(env)?,
        Commands::Check { config, confdir } => commands::check::run(config, confdir)?,
        Commands::Init => commands::init::run(),
    }

    Ok(())
}
