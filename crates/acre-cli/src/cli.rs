//! Command-line definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Multi-field crop allocation planner.
#[derive(Debug, Parser)]
#[command(name = "acre", version, about = "Plan crop allocations across fields")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level filter (e.g. "info", "acre_algo=debug")
    #[arg(long, global = true, default_value = "info")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the optimizer on a request document
    Optimize {
        /// Planning request JSON
        #[arg(long)]
        request: PathBuf,
        /// Weather series file (.json or .csv)
        #[arg(long)]
        weather: PathBuf,
        /// Crop profile document (required unless every crop spec carries
        /// an inline profile)
        #[arg(long)]
        profiles: Option<PathBuf>,
        /// Interaction rule list (merged when the request has none)
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Check a request document without optimizing
    Validate {
        /// Planning request JSON
        #[arg(long)]
        request: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Readable per-field schedule tables
    Human,
    /// The full optimization result as JSON
    Json,
}
