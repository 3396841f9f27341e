//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// PlanDraft - guided business-plan drafting
#[derive(Parser)]
#[command(
    name = "plandraft",
    about = "Guided business-plan drafting over a streaming generative model",
    version,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one conversational exchange for a section
    Chat {
        /// Section to work on (general-info, overview, problem, solution, growth, team)
        #[arg(short, long)]
        section: String,

        /// Open the section with its first question set
        #[arg(long)]
        start: bool,

        /// Generate a full section draft from the conversation so far
        #[arg(long)]
        draft: bool,

        /// JSON file with the conversation history: [{"role": "user", "content": "..."}, ...]
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,

        /// Reference document to include (repeatable; the file name becomes the label)
        #[arg(long = "reference", value_name = "FILE")]
        references: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Wait for the full response instead of streaming
        #[arg(long)]
        no_stream: bool,
    },

    /// List the business-plan sections
    Sections,
}

/// Output format for chat exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw generated text
    Text,
    /// Server-sent event frames, as handed to a transport
    Sse,
}
