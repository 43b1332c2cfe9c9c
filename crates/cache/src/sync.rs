//! One sync pass against a [`CacheManager`]
//!
//! The caller fetches tasks upstream (all tasks for a full sync, tasks
//! modified since [`CacheManager::last_sync`] for an incremental one) and
//! hands them here. The pipeline settles the raw list, then rebuilds the
//! derived layers from it. The derived layers are only written once the raw
//! save succeeded, so `last_sync` never claims data layer 3 does not hold. A
//! failed derived layer does not undo the raw save.

use crate::facets::{extract_filter_metadata, group_tasks};
use crate::manager::CacheManager;
use crate::merge::MergeOptions;
use crate::model::Task;
use serde::Serialize;

/// How fetched tasks relate to the cached raw list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Fetched tasks are the whole corpus and replace the raw layer
    Full,
    /// Fetched tasks are a delta merged over the raw layer by id
    Incremental,
}

/// What a sync pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Mode the pass ran in
    pub mode: SyncMode,
    /// Tasks handed to the pass
    pub fetched: usize,
    /// Tasks in the raw layer afterwards
    pub total: usize,
    /// Delta tasks not previously cached
    pub inserted: usize,
    /// Cached tasks replaced by delta tasks
    pub updated: usize,
    /// Delta tasks skipped by change verification
    pub unchanged: usize,
    /// Number of project/list groups written to layer 2
    pub groups: usize,
    /// Layer 1 written
    pub metadata_saved: bool,
    /// Layer 2 written
    pub processed_saved: bool,
    /// Layer 3 written
    pub raw_saved: bool,
}

impl SyncOutcome {
    /// Whether every layer was written
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.metadata_saved && self.processed_saved && self.raw_saved
    }
}

/// Drives sync passes against one manager
#[derive(Debug)]
pub struct SyncPipeline<'a> {
    manager: &'a CacheManager,
    merge_options: MergeOptions,
}

impl<'a> SyncPipeline<'a> {
    /// Pipeline trusting upstream's modified-since filter
    #[must_use]
    pub fn new(manager: &'a CacheManager) -> Self {
        Self {
            manager,
            merge_options: MergeOptions::default(),
        }
    }

    /// Use the given merge options for incremental passes
    #[must_use]
    pub fn with_merge_options(mut self, options: MergeOptions) -> Self {
        self.merge_options = options;
        self
    }

    /// Run one pass
    pub async fn apply(&self, fetched: Vec<Task>, mode: SyncMode) -> SyncOutcome {
        let fetched_count = fetched.len();
        let (tasks, inserted, updated, unchanged) = match mode {
            SyncMode::Full => (fetched, fetched_count, 0, 0),
            SyncMode::Incremental => {
                let report = self
                    .manager
                    .merge_incremental_update_with(fetched, self.merge_options)
                    .await;
                (report.tasks, report.inserted, report.updated, report.unchanged)
            }
        };

        let raw_saved = self.manager.save_raw_data(&tasks).await;
        let groups = group_tasks(&tasks);

        // Layer 1 carries the last sync time; it must not move past data
        // layer 3 never received, or the next delta query skips it
        let (metadata_saved, processed_saved) = if raw_saved {
            let facets = extract_filter_metadata(&tasks);
            (
                self.manager.save_metadata(&facets, tasks.len()),
                self.manager.save_processed_data(&groups),
            )
        } else {
            tracing::warn!(?mode, "Raw save failed, keeping previous metadata and views");
            (false, false)
        };

        let outcome = SyncOutcome {
            mode,
            fetched: fetched_count,
            total: tasks.len(),
            inserted,
            updated,
            unchanged,
            groups: groups.len(),
            metadata_saved,
            processed_saved,
            raw_saved,
        };

        if outcome.is_complete() {
            tracing::info!(?mode, fetched = fetched_count, total = outcome.total, "Sync complete");
        } else {
            tracing::warn!(
                ?mode,
                metadata_saved,
                processed_saved,
                raw_saved,
                "Sync finished with layers missing"
            );
        }
        outcome
    }
}
