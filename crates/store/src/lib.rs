//! Key-value persistence adapters for the DailyFlow cache
//!
//! The cache keeps its three layers on two kinds of substrate:
//! - [`SyncStore`]: small, string-only, capacity-limited, blocking. Holds the
//!   metadata and processed layers.
//! - [`AsyncStore`]: large, structured values, awaited. Holds the raw task
//!   layer.
//!
//! Both come in an in-memory flavour (used by tests, one fresh instance per
//! test) and a file-backed flavour used by the CLI.
//!
//! No transactional guarantee is made across keys.

mod documents;
mod error;
mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use documents::FileAsyncStore;
pub use error::{Result, StoreError};
pub use file::FileSyncStore;
pub use memory::{MemoryAsyncStore, MemorySyncStore};

/// Default sync store capacity: 5 MiB of UTF-16 storage, matching browser
/// local storage.
pub const DEFAULT_SYNC_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Estimated storage cost of a string in bytes (UTF-16 code units x 2).
#[must_use]
pub fn utf16_byte_len(s: &str) -> usize {
    s.encode_utf16().count() * 2
}

/// Synchronous small-value store.
///
/// `set` may fail with [`StoreError::QuotaExceeded`]; the previous value for
/// the key is left untouched in that case.
pub trait SyncStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently present
    fn keys(&self) -> Result<Vec<String>>;
}

/// Asynchronous large-value store holding structured documents.
#[async_trait]
pub trait AsyncStore: Send + Sync {
    /// Read the document stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous document
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_len_counts_code_units() {
        assert_eq!(utf16_byte_len(""), 0);
        assert_eq!(utf16_byte_len("abc"), 6);
        // Non-BMP characters take a surrogate pair
        assert_eq!(utf16_byte_len("\u{1F600}"), 4);
        assert_eq!(utf16_byte_len("é"), 2);
    }
}
