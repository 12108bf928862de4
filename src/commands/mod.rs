//! Subcommand bodies for the `faqrank` binary

pub mod index;
pub mod init;
pub mod search;

/// Search output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// Pretty-printed JSON report
    Json,
}
