//! MetaMind CLI
//!
//! Document a relational schema with an LLM and ask follow-up questions.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::commands::{
    DocumentArgs, GatewayArgs, SourceArgs, handle_chat, handle_document, handle_tables,
};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "metamind")]
#[command(about = "Generate documentation for a database schema and chat about it")]
#[command(version)]
struct Cli {
    /// Groq API key (overrides GROQ_API_KEY, .env and the secrets file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Gateway configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Dotenv file holding GROQ_API_KEY [default: .env]
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Secrets file holding GROQ_API_KEY
    #[arg(long, global = true, value_name = "PATH")]
    secrets: Option<PathBuf>,

    /// Log every gateway attempt
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables and columns without calling the LLM
    Tables {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Generate documentation for the whole schema or per table
    Document {
        #[command(flatten)]
        source: SourceArgs,

        /// Send one request per table
        #[arg(long)]
        per_table: bool,

        /// Sample rows to include per table (databases only)
        /// [default: 3 with --per-table, otherwise 0]
        #[arg(long, value_name = "N")]
        samples: Option<usize>,
    },
    /// Generate documentation, then answer questions read from stdin
    Chat {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn run_cmd(result: Result<(), CliError>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .init();

    let gateway = GatewayArgs {
        api_key: cli.api_key,
        config: cli.config,
        env_file: cli.env_file,
        secrets: cli.secrets,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Tables { source } => run_cmd(handle_tables(&source)),
        Commands::Document {
            source,
            per_table,
            samples,
        } => run_cmd(handle_document(
            &source,
            &gateway,
            &DocumentArgs { per_table, samples },
        )),
        Commands::Chat { source } => run_cmd(handle_chat(&source, &gateway)),
    }
}
