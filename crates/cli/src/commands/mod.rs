//! Subcommand implementations
//!
//! Each command works against an already-built [`CacheManager`] and writes
//! its JSON result to the given writer.

pub mod clear;
pub mod inspect;
pub mod recover;
pub mod sync;

use crate::cli::Commands;
use crate::errors::Result;
use dailyflow_cache::CacheManager;
use std::io::Write;

/// Run one subcommand
pub async fn execute<W: Write>(command: Commands, manager: &CacheManager, out: &mut W) -> Result<()> {
    match command {
        Commands::Sync {
            input,
            incremental,
            verify_changes,
        } => sync::run(manager, &input, incremental, verify_changes, out).await,
        Commands::Stats => inspect::stats(manager, out).await,
        Commands::Status => inspect::status(manager, out).await,
        Commands::Show { what } => inspect::show(manager, what, out).await,
        Commands::Clear { layer } => clear::run(manager, layer, out).await,
        Commands::Recover { import } => recover::run(manager, import, out).await,
    }
}
