//! `dailyflow recover`

use crate::errors::Result;
use crate::output::write_json;
use dailyflow_cache::{CacheManager, SyncMode, SyncPipeline};
use serde_json::json;
use std::io::Write;

/// Report legacy data and optionally import it as a full sync
pub async fn run<W: Write>(manager: &CacheManager, import: bool, out: &mut W) -> Result<()> {
    let recovered = manager.try_recover_from_old_cache();
    if !import {
        return write_json(out, &recovered);
    }

    let source_key = recovered.source_key.clone();
    let tasks = recovered.into_tasks();
    if tasks.is_empty() {
        tracing::warn!("No legacy tasks to import");
        return write_json(out, &json!({ "imported": null, "sourceKey": source_key }));
    }

    let outcome = SyncPipeline::new(manager).apply(tasks, SyncMode::Full).await;
    write_json(out, &json!({ "imported": outcome, "sourceKey": source_key }))
}
