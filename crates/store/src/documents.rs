//! Directory-backed asynchronous document store
//!
//! Each key maps to `{root}/{escaped key}.json`. Writes go through a
//! temporary file and a rename.

use crate::{AsyncStore, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// [`AsyncStore`] keeping one JSON document per key in a directory
#[derive(Debug, Clone)]
pub struct FileAsyncStore {
    root: PathBuf,
}

impl FileAsyncStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `key`
    ///
    /// Bytes outside `[A-Za-z0-9._-]` are written as `%XX`, so distinct keys
    /// always map to distinct files.
    #[must_use]
    pub fn document_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
                name.push(char::from(byte));
            } else {
                // Writing to a String cannot fail
                let _ = write!(name, "%{byte:02X}");
            }
        }
        self.root.join(format!("{name}.json"))
    }
}

#[async_trait]
impl AsyncStore for FileAsyncStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.document_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(e, &path, "read")),
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::serialization(format!("Document {} is not valid JSON: {e}", path.display()))
        })?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(e, &self.root, "create_dir_all"))?;

        let path = self.document_path(key);
        let json = serde_json::to_vec(&value)
            .map_err(|e| StoreError::serialization(format!("Failed to encode document: {e}")))?;

        let tmp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| StoreError::io(e, &tmp_path, "create"))?;
        file.write_all(&json)
            .await
            .map_err(|e| StoreError::io(e, &tmp_path, "write"))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io(e, &tmp_path, "sync"))?;
        drop(file);

        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::io(e, &path, "rename"))?;
        tracing::trace!(key, path = %path.display(), bytes = json.len(), "Wrote document");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.document_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(e, &path, "remove_file")),
        }
    }
}
