//! CLI module for the document QA tool.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use self::output::OutputFormat;

/// Ask questions over a PDF corpus with cited answers.
#[derive(Debug, Parser)]
#[command(name = "docqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest all PDFs from a directory into the vector index
    Ingest {
        /// Directory containing PDF files
        #[arg(required = true)]
        dir: PathBuf,
    },

    /// List ingested sources with their distinct page counts
    Sources,

    /// Ask a question over the ingested corpus
    Ask {
        /// Natural-language question
        #[arg(required = true)]
        question: String,

        /// Restrict retrieval to one source filename
        #[arg(long, short = 's')]
        source: Option<String>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}
