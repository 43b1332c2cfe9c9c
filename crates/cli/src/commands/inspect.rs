//! `dailyflow stats`, `status` and `show`

use crate::cli::ShowTarget;
use crate::errors::{CliError, Result};
use crate::output::write_json;
use dailyflow_cache::CacheManager;
use std::io::Write;

/// Print per-layer storage footprint
pub async fn stats<W: Write>(manager: &CacheManager, out: &mut W) -> Result<()> {
    write_json(out, &manager.get_cache_stats().await)
}

/// Print layer presence and cache age
pub async fn status<W: Write>(manager: &CacheManager, out: &mut W) -> Result<()> {
    write_json(out, &manager.get_cache_status().await)
}

/// Print one cached layer
pub async fn show<W: Write>(manager: &CacheManager, what: ShowTarget, out: &mut W) -> Result<()> {
    match what {
        ShowTarget::Metadata => {
            let record = manager
                .load_metadata()
                .ok_or_else(|| CliError::not_cached("metadata"))?;
            write_json(out, &record)
        }
        ShowTarget::Groups => {
            let groups = manager
                .load_processed_data()
                .ok_or_else(|| CliError::not_cached("processed"))?;
            write_json(out, &groups)
        }
        ShowTarget::Tasks => {
            let tasks = manager
                .load_raw_data()
                .await
                .ok_or_else(|| CliError::not_cached("raw"))?;
            write_json(out, &tasks)
        }
    }
}
