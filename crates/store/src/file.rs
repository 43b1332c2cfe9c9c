//! File-backed synchronous store
//!
//! All keys live in one JSON object on disk. The file is loaded when the
//! store is opened and rewritten on every mutation using a temporary file and
//! an atomic rename, so a crash mid-write leaves the previous state intact.

use crate::memory::check_quota;
use crate::{DEFAULT_SYNC_QUOTA_BYTES, Result, StoreError, SyncStore};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// [`SyncStore`] persisted to a single JSON file
#[derive(Debug)]
pub struct FileSyncStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl FileSyncStore {
    /// Open (or create on first write) the store at `path` with the default quota
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_quota(path, Some(DEFAULT_SYNC_QUOTA_BYTES))
    }

    /// Open the store with an explicit quota (`None` for unbounded)
    ///
    /// A file that is not a JSON object of strings is moved to
    /// `<path>.corrupt` and the store opens empty.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn open_with_quota(path: impl Into<PathBuf>, quota: Option<usize>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| StoreError::io(e, &path, "read"))?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                match serde_json::from_str::<HashMap<String, String>>(&content) {
                    Ok(entries) => entries,
                    Err(e) => {
                        set_aside_corrupt(&path, &e);
                        HashMap::new()
                    }
                }
            }
        } else {
            HashMap::new()
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened sync store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            quota,
        })
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(e, parent, "create_dir_all"))?;
        }
        let json = serde_json::to_vec(entries)
            .map_err(|e| StoreError::serialization(format!("Failed to encode store: {e}")))?;

        let tmp_path = self.path.with_extension("tmp");
        let mut file =
            fs::File::create(&tmp_path).map_err(|e| StoreError::io(e, &tmp_path, "create"))?;
        file.write_all(&json)
            .map_err(|e| StoreError::io(e, &tmp_path, "write"))?;
        file.sync_all()
            .map_err(|e| StoreError::io(e, &tmp_path, "sync"))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::io(e, &self.path, "rename"))
    }
}

/// Move an unparsable store file out of the way so the next write starts clean
fn set_aside_corrupt(path: &Path, error: &serde_json::Error) {
    let aside = path.with_extension("corrupt");
    match fs::rename(path, &aside) {
        Ok(()) => tracing::warn!(
            path = %path.display(),
            moved_to = %aside.display(),
            error = %error,
            "Store file is not a string map, starting empty"
        ),
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %error,
            rename_error = %e,
            "Store file is not a string map and could not be moved, starting empty"
        ),
    }
}

fn poisoned() -> StoreError {
    StoreError::unavailable("file store lock poisoned")
}

impl SyncStore for FileSyncStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        check_quota(&entries, self.quota, key, value)?;

        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("local_storage.json");

        let store = FileSyncStore::open(&path).unwrap();
        store.set("dailyFlow_metadata_v3", "{\"a\":1}").unwrap();
        store.set("other", "x").unwrap();
        store.remove("other").unwrap();
        drop(store);

        let reopened = FileSyncStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("dailyFlow_metadata_v3").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert_eq!(reopened.get("other").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_quota_failure_does_not_touch_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");

        let store = FileSyncStore::open_with_quota(&path, Some(16)).unwrap();
        store.set("k", "v").unwrap();
        assert!(store.set("k", "way past the quota").unwrap_err().is_quota_exceeded());

        let reopened = FileSyncStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_corrupt_file_is_set_aside() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");

        for bad in ["not json", r#"{"dailyFlow_metadata_v3": 1}"#, "[\"a\"]"] {
            fs::write(&path, bad).unwrap();

            let store = FileSyncStore::open(&path).unwrap();
            assert!(store.keys().unwrap().is_empty(), "{bad}");
            assert!(!path.exists());
            assert_eq!(
                fs::read_to_string(path.with_extension("corrupt")).unwrap(),
                bad
            );

            store.set("k", "v").unwrap();
            let reopened = FileSyncStore::open(&path).unwrap();
            assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
            fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn test_empty_file_opens_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        fs::write(&path, "").unwrap();

        let store = FileSyncStore::open(&path).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
