//! Field-level change detection between two versions of a task

use crate::model::Task;

/// Whether `new` differs from `old` in any field the dashboard displays.
///
/// `date_updated` is checked first: when both sides carry it and it moved,
/// the task changed. Otherwise the visible fields are compared one by one,
/// since some upstream edits (tag changes, time tracking) do not bump it.
#[must_use]
pub fn has_task_changed(old: &Task, new: &Task) -> bool {
    if let (Some(before), Some(after)) = (&old.date_updated, &new.date_updated) {
        if before != after {
            return true;
        }
    }

    old.name != new.name
        || old.status_name() != new.status_name()
        || old.priority.as_ref().map(|p| &p.priority) != new.priority.as_ref().map(|p| &p.priority)
        || !same_by(&old.tags, &new.tags, |t| t.name.as_str())
        || !same_by(&old.assignees, &new.assignees, |a| {
            a.email.as_deref().or(a.username.as_deref()).unwrap_or_default()
        })
        || !same_by(&old.subtasks, &new.subtasks, |s| s.id.as_str())
        || old.time_estimate != new.time_estimate
        || old.time_spent != new.time_spent
        || old.due_date != new.due_date
        || old.date_closed != new.date_closed
}

/// Compare two lists by a key, ignoring order
fn same_by<T>(a: &[T], b: &[T], key: impl Fn(&T) -> &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut left: Vec<&str> = a.iter().map(&key).collect();
    let mut right: Vec<&str> = b.iter().map(&key).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}
