//! Salvage of data written by pre-v3 cache formats
//!
//! Older dashboards stored tasks under a handful of fixed keys in several
//! shapes: a bare JSON array, or an object carrying the array in `tasks` or
//! `data`. The scan is best-effort; any key that cannot be read or parsed is
//! skipped.

use crate::config::{LEGACY_KEYS, LEGACY_META_KEY};
use crate::model::Task;
use dailyflow_store::SyncStore;
use serde::Serialize;
use serde_json::Value;

/// Result of a legacy scan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredCache {
    /// First array-shaped payload found
    pub data: Option<Vec<Value>>,
    /// Legacy configuration blob
    pub config: Option<Value>,
    /// Key the data was found under
    pub source_key: Option<String>,
}

impl RecoveredCache {
    /// Whether the scan found anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.config.is_none()
    }

    /// Convert salvaged entries into tasks, dropping entries without a task shape
    #[must_use]
    pub fn into_tasks(self) -> Vec<Task> {
        let entries = self.data.unwrap_or_default();
        let total = entries.len();
        let tasks: Vec<Task> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        if tasks.len() < total {
            tracing::debug!(
                kept = tasks.len(),
                dropped = total - tasks.len(),
                "Dropped legacy entries without a task shape"
            );
        }
        tasks
    }
}

/// Pull the task array out of a legacy payload
fn array_payload(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["tasks", "data"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_array)),
        _ => None,
    }
}

/// Scan the legacy keys of `store`
pub fn recover_from_legacy(store: &dyn SyncStore) -> RecoveredCache {
    let mut recovered = RecoveredCache::default();

    for key in LEGACY_KEYS {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(key, error = %e, "Skipping unreadable legacy key");
                continue;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Skipping unparsable legacy key");
                continue;
            }
        };

        if recovered.data.is_none() {
            if let Some(items) = array_payload(&value) {
                tracing::info!(key, entries = items.len(), "Recovered legacy task data");
                recovered.data = Some(items.clone());
                recovered.source_key = Some(key.to_string());
            }
        }

        if recovered.config.is_none() {
            if let Some(config) = value.get("config") {
                recovered.config = Some(config.clone());
            } else if key == LEGACY_META_KEY && value.is_object() {
                recovered.config = Some(value);
            }
        }
    }

    recovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyflow_store::MemorySyncStore;
    use serde_json::json;

    #[test]
    fn test_nothing_to_recover() {
        let store = MemorySyncStore::new();
        let recovered = recover_from_legacy(&store);
        assert!(recovered.is_empty());
        assert!(recovered.into_tasks().is_empty());
    }

    #[test]
    fn test_bare_array_is_recovered() {
        let store = MemorySyncStore::new();
        store
            .set("dailyFlowCachedData", r#"[{"id":"1","name":"A"}]"#)
            .unwrap();

        let recovered = recover_from_legacy(&store);
        assert_eq!(recovered.source_key.as_deref(), Some("dailyFlowCachedData"));
        let tasks = recovered.into_tasks();
        assert_eq!(tasks, vec![Task::new("1", "A")]);
    }

    #[test]
    fn test_first_key_in_scan_order_wins() {
        let store = MemorySyncStore::new();
        store
            .set("clickup_cache_data", r#"{"data":[{"id":"2"}],"config":{"team":"42"}}"#)
            .unwrap();
        store.set("dailyFlowCachedData", r#"{"tasks":[{"id":"1"}]}"#).unwrap();

        let recovered = recover_from_legacy(&store);
        assert_eq!(recovered.source_key.as_deref(), Some("dailyFlowCachedData"));
        assert_eq!(recovered.data, Some(vec![json!({"id": "1"})]));
        assert_eq!(recovered.config, Some(json!({"team": "42"})));
    }

    #[test]
    fn test_corrupt_key_is_skipped() {
        let store = MemorySyncStore::new();
        store.set("dailyFlowCachedData", "{oops").unwrap();
        store.set("clickup_cache_data", r#"[{"id":"9"}]"#).unwrap();
        store
            .set("dailyFlowCacheMeta", r#"{"lastSync":1700000000000,"listIds":["a"]}"#)
            .unwrap();

        let recovered = recover_from_legacy(&store);
        assert_eq!(recovered.source_key.as_deref(), Some("clickup_cache_data"));
        assert_eq!(
            recovered.config,
            Some(json!({"lastSync": 1_700_000_000_000_i64, "listIds": ["a"]}))
        );
    }

    #[test]
    fn test_non_task_entries_are_dropped() {
        let recovered = RecoveredCache {
            data: Some(vec![json!({"id": "1"}), json!("junk"), json!({"name": "no id"})]),
            ..Default::default()
        };
        let tasks = recovered.into_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "1");
    }
}
