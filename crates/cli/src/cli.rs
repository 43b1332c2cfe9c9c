use crate::logging::{LogFormat, LogLevel};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command line interface
#[derive(Parser, Debug)]
#[command(name = "dailyflow")]
#[command(about = "Local three-layer cache for ClickUp task data")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./dailyflow.toml when present)
    #[arg(long, global = true, env = "DAILYFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache directory override
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Logging level (overrides the config file)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub level: Option<LogLevel>,

    /// Log format (overrides the config file)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Apply a task export to the cache
    Sync {
        /// JSON file holding a task array or an object with a `tasks` array
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// Treat the export as a delta of modified tasks
        #[arg(long)]
        incremental: bool,
        /// Skip delta tasks identical to their cached copy
        #[arg(long, requires = "incremental")]
        verify_changes: bool,
    },
    /// Show storage footprint per layer
    Stats,
    /// Show layer presence and cache age
    Status,
    /// Print a cached layer
    Show {
        /// Layer to print
        #[arg(value_enum)]
        what: ShowTarget,
    },
    /// Clear one layer, or everything including legacy keys
    Clear {
        /// Layer number
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        layer: Option<u8>,
    },
    /// Look for data left by older cache formats
    Recover {
        /// Import recovered tasks as a full sync
        #[arg(long)]
        import: bool,
    },
}

/// Printable layers
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTarget {
    /// Layer 1 facet metadata
    Metadata,
    /// Layer 2 project/list groups
    Groups,
    /// Layer 3 raw tasks
    Tasks,
}

/// Parse process arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
