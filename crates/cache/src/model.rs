//! Task and cache record types
//!
//! [`Task`] mirrors the ClickUp task document. Fields the cache reasons about
//! are typed; everything else is kept in [`Task::extra`] so a save/load cycle
//! reproduces the upstream document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A ClickUp task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Task {
    /// Stable task identifier, the merge key
    pub id: String,
    /// Task title
    #[serde(default)]
    pub name: String,
    /// Workflow status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Tags attached to the task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Assigned users
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<Assignee>,
    /// Child tasks (references only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskRef>,
    /// Priority, absent when unset upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// List the task lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Container>,
    /// Project (space) the task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Container>,
    /// Folder the list belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<Container>,
    /// Estimated time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<i64>,
    /// Tracked time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<i64>,
    /// Due date, unix milliseconds as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Close date, unix milliseconds as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_closed: Option<String>,
    /// Last modification, unix milliseconds as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,
    /// Fields not modelled above, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Create a task with just an id and a name
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Status name, if any
    #[must_use]
    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.status.as_str())
    }
}

/// Task status as reported by ClickUp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TaskStatus {
    /// Status label, e.g. "in progress"
    pub status: String,
    /// Display colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Status category ("open", "custom", "closed", ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Task tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Tag {
    /// Tag label
    pub name: String,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User assigned to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Assignee {
    /// Upstream user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email, used as the assignee facet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a subtask
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TaskRef {
    /// Subtask id
    pub id: String,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Task priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Priority {
    /// Priority label ("urgent", "high", "normal", "low")
    pub priority: String,
    /// Display colour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named ClickUp container (list, folder, project)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Container {
    /// Container id
    #[serde(default)]
    pub id: String,
    /// Container name
    #[serde(default)]
    pub name: String,
    /// Remaining upstream fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Distinct facet values across a task corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterMetadata {
    /// Tag names
    pub tags: BTreeSet<String>,
    /// Status names
    pub statuses: BTreeSet<String>,
    /// Assignee emails (usernames when no email is set)
    pub assignees: BTreeSet<String>,
    /// Project names
    pub projects: BTreeSet<String>,
    /// Priority names
    pub priorities: BTreeSet<String>,
}

/// Layer 1 record: facet metadata stamped with version and sync time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    /// Cache format version
    pub version: String,
    /// When the sync that produced this record finished
    pub last_sync: DateTime<Utc>,
    /// Number of tasks the facets were extracted from
    pub task_count: usize,
    /// Facet sets
    #[serde(flatten)]
    pub facets: FilterMetadata,
}

/// Tasks bucketed by project and list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupedData {
    /// Project id (empty when the task has none)
    pub project_id: String,
    /// Project name
    pub project_name: String,
    /// List id
    pub list_id: String,
    /// List name
    pub list_name: String,
    /// Tasks in this bucket
    pub tasks: Vec<Task>,
}

/// Layer 2 record: compressed grouped views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRecord {
    /// Cache format version
    pub version: String,
    /// Write time
    pub timestamp: DateTime<Utc>,
    /// Compressed JSON of `Vec<GroupedData>`
    pub compressed_payload: String,
}

/// Layer 3 record: the canonical task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTaskRecord {
    /// All cached tasks
    pub tasks: Vec<Task>,
    /// Write time
    pub timestamp: DateTime<Utc>,
    /// Cache format version
    pub version: String,
    /// Number of tasks, kept for cheap stats
    pub count: usize,
}
