//! In-memory store doubles

use crate::{AsyncStore, Result, StoreError, SyncStore, utf16_byte_len};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Storage cost of the whole map if `key` were set to `value`.
pub(crate) fn projected_usage(entries: &HashMap<String, String>, key: &str, value: &str) -> usize {
    let others: usize = entries
        .iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| utf16_byte_len(k) + utf16_byte_len(v))
        .sum();
    others + utf16_byte_len(key) + utf16_byte_len(value)
}

/// Check a pending write against an optional quota.
pub(crate) fn check_quota(
    entries: &HashMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let requested = projected_usage(entries, key, value);
    if requested > quota {
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            requested,
            quota,
        });
    }
    Ok(())
}

fn poisoned() -> StoreError {
    StoreError::unavailable("in-memory store lock poisoned")
}

/// In-memory [`SyncStore`] with an optional capacity limit
#[derive(Debug, Default)]
pub struct MemorySyncStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemorySyncStore {
    /// Create an unbounded store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes past `quota_bytes` (UTF-16 estimate)
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota_bytes),
        }
    }

    /// Current estimated usage in bytes
    pub fn usage(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries
            .iter()
            .map(|(k, v)| utf16_byte_len(k) + utf16_byte_len(v))
            .sum())
    }
}

impl SyncStore for MemorySyncStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        check_quota(&entries, self.quota, key, value)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// In-memory [`AsyncStore`]
#[derive(Debug, Default)]
pub struct MemoryAsyncStore {
    entries: tokio::sync::RwLock<HashMap<String, Value>>,
}

impl MemoryAsyncStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AsyncStore for MemoryAsyncStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sync_set_get_remove() {
        let store = MemorySyncStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        // Removing a missing key is fine
        store.remove("a").unwrap();
    }

    #[test]
    fn test_quota_rejects_and_keeps_previous_value() {
        // "k" + "small" = 6 UTF-16 units = 12 bytes
        let store = MemorySyncStore::with_quota(20);
        store.set("k", "small").unwrap();
        assert_eq!(store.usage().unwrap(), 12);

        let err = store.set("k", "much too large").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("small"));
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let store = MemorySyncStore::with_quota(12);
        store.set("k", "abcde").unwrap();
        // Overwriting with a same-size value fits because the old value is released
        store.set("k", "vwxyz").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("vwxyz"));
    }

    #[tokio::test]
    async fn test_async_set_get_delete() {
        let store = MemoryAsyncStore::new();
        assert!(store.is_empty().await);

        store.set("raw", json!({"tasks": [1, 2]})).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get("raw").await.unwrap(),
            Some(json!({"tasks": [1, 2]}))
        );

        store.delete("raw").await.unwrap();
        assert_eq!(store.get("raw").await.unwrap(), None);
        store.delete("raw").await.unwrap();
    }
}
