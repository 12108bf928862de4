//! faqrank: Hybrid FAQ Retrieval
//!
//! Fuses dense and lexical search over an FAQ index with Reciprocal Rank Fusion.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::OutputFormat;
use faqrank::config::{Config, LogFormat, LoggingConfig, DEFAULT_CONFIG_FILE};
use faqrank::types::RetrievalMode;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "faqrank")]
#[command(about = "Hybrid FAQ retrieval with Reciprocal Rank Fusion")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "FAQRANK_CONFIG")]
    config: PathBuf,

    /// Verbosity level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Retrieve the top FAQ entries for a question
    Search {
        /// Question text
        query: String,

        /// Retrieval mode (defaults to the configured one)
        #[arg(short, long, value_enum)]
        mode: Option<CliMode>,

        /// Number of documents to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Print the assembled LLM prompt instead of the documents
        #[arg(long)]
        prompt: bool,
    },

    /// Embed and index FAQ records from a JSON file
    Index {
        /// JSON array of {Category, Question, Answer, doc_id?}
        file: PathBuf,

        /// Drop and recreate the index first
        #[arg(long)]
        recreate: bool,

        /// No progress output
        #[arg(short, long)]
        quiet: bool,
    },
}

/// CLI retrieval mode (mirrors RetrievalMode with clap support)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliMode {
    /// Keyword search only
    Lexical,
    /// Vector + keyword search fused with RRF
    Hybrid,
}

impl From<CliMode> for RetrievalMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Lexical => RetrievalMode::Lexical,
            CliMode::Hybrid => RetrievalMode::Hybrid,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path, force } = &cli.command {
        init_tracing(&LoggingConfig::default(), cli.verbose);
        return commands::init::init_config(path, *force);
    }

    let config = Config::load_or_default(&cli.config)?;
    init_tracing(&config.logging, cli.verbose);

    match cli.command {
        Commands::Search {
            query,
            mode,
            top_k,
            format,
            prompt,
        } => commands::search::search_faqs(config, query, mode.map(Into::into), top_k, format, prompt).await,
        Commands::Index { file, recreate, quiet } => {
            commands::index::index_faqs(config, &file, recreate, quiet).await
        }
        Commands::Init { .. } => Ok(()),
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig, verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive(verbose)));

    match logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}
