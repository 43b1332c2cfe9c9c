//! `dailyflow sync`: apply a task export to the cache

use crate::errors::{CliError, Result};
use crate::output::write_json;
use dailyflow_cache::{CacheManager, MergeOptions, SyncMode, SyncPipeline, Task};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Read a task export: a bare array, or an object with a `tasks` array
///
/// # Errors
///
/// Returns error if the file cannot be read or does not hold tasks
pub fn read_tasks(path: &Path) -> Result<Vec<Task>> {
    let text = fs::read_to_string(path).map_err(|e| CliError::file("read", path, e))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| CliError::invalid_input(path, format!("not JSON: {e}")))?;

    let tasks = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove("tasks")
            .filter(Value::is_array)
            .ok_or_else(|| CliError::invalid_input(path, "object has no `tasks` array"))?,
        _ => return Err(CliError::invalid_input(path, "expected an array or object")),
    };

    serde_json::from_value(tasks)
        .map_err(|e| CliError::invalid_input(path, format!("task list is malformed: {e}")))
}

/// Run a sync pass from `input`
pub async fn run<W: Write>(
    manager: &CacheManager,
    input: &Path,
    incremental: bool,
    verify_changes: bool,
    out: &mut W,
) -> Result<()> {
    let tasks = read_tasks(input)?;
    let mode = if incremental {
        SyncMode::Incremental
    } else {
        SyncMode::Full
    };

    if incremental {
        match manager.last_sync() {
            Some(since) => tracing::info!(%since, "Applying delta modified since last sync"),
            None => tracing::info!("No previous sync recorded, delta becomes the whole cache"),
        }
    }

    let outcome = SyncPipeline::new(manager)
        .with_merge_options(MergeOptions { verify_changes })
        .apply(tasks, mode)
        .await;
    write_json(out, &outcome)
}
