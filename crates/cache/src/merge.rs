//! Incremental merge-by-id
//!
//! The incoming list is taken to be exactly the tasks upstream reports as
//! modified since the last sync. Filtering is the sync driver's job; the
//! merge overwrites or inserts every incoming task by `id` without checking
//! staleness unless [`MergeOptions::verify_changes`] is set.
//!
//! There are no tombstones: a task deleted upstream stays cached until a full
//! sync replaces the raw layer.

use crate::changes::has_task_changed;
use crate::model::Task;
use std::collections::HashMap;

/// Options for [`merge_with_options`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Keep the cached copy of tasks the change detector reports as unchanged
    pub verify_changes: bool,
}

/// Outcome of a merge with counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Merged task list. Order is not part of the contract.
    pub tasks: Vec<Task>,
    /// Incoming tasks whose id was not cached
    pub inserted: usize,
    /// Cached tasks replaced by an incoming version
    pub updated: usize,
    /// Incoming tasks skipped because they matched the cached copy
    pub unchanged: usize,
}

/// Merge `incoming` over `cached` by id, last writer wins.
///
/// With no cache the incoming list is returned as-is.
#[must_use]
pub fn merge_by_id(cached: Option<Vec<Task>>, incoming: Vec<Task>) -> Vec<Task> {
    merge_with_options(cached, incoming, MergeOptions::default()).tasks
}

/// [`merge_by_id`] with options and counters
#[must_use]
pub fn merge_with_options(
    cached: Option<Vec<Task>>,
    incoming: Vec<Task>,
    options: MergeOptions,
) -> MergeReport {
    let Some(mut tasks) = cached else {
        return MergeReport {
            inserted: incoming.len(),
            tasks: incoming,
            ..Default::default()
        };
    };

    let mut index: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (task.id.clone(), i))
        .collect();

    let mut report = MergeReport::default();
    for task in incoming {
        match index.get(&task.id) {
            Some(&slot) => {
                if options.verify_changes && !has_task_changed(&tasks[slot], &task) {
                    report.unchanged += 1;
                    continue;
                }
                tasks[slot] = task;
                report.updated += 1;
            }
            None => {
                index.insert(task.id.clone(), tasks.len());
                tasks.push(task);
                report.inserted += 1;
            }
        }
    }

    report.tasks = tasks;
    report
}
