//! The three-layer cache manager
//!
//! | Layer | Store | Content |
//! |---|---|---|
//! | 1 metadata | sync | facet sets, last sync time |
//! | 2 processed | sync | compressed grouped views |
//! | 3 raw | async | canonical task list |
//!
//! Every record carries the configured format version. A record with a
//! different version, a parse failure or a decompression failure is a miss,
//! and the offending key is removed so it cannot fail again on the next read.
//! A store that fails to read is also a miss, but nothing is removed.
//! No public operation returns an error; failures are logged and degrade to
//! "no cached data".

use crate::codec::Codec;
use crate::config::{CacheConfig, LEGACY_KEYS};
use crate::merge::{MergeOptions, MergeReport, merge_with_options};
use crate::model::{FilterMetadata, GroupedData, MetadataRecord, ProcessedRecord, RawTaskRecord, Task};
use crate::recovery::{RecoveredCache, recover_from_legacy};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use dailyflow_store::{AsyncStore, SyncStore, utf16_byte_len};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One of the three cache tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLayer {
    /// Layer 1: facet metadata
    Metadata,
    /// Layer 2: compressed grouped views
    Processed,
    /// Layer 3: raw task list
    Raw,
}

impl CacheLayer {
    /// Every layer, in order
    pub const ALL: [Self; 3] = [Self::Metadata, Self::Processed, Self::Raw];

    /// Layer number (1-3)
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Metadata => 1,
            Self::Processed => 2,
            Self::Raw => 3,
        }
    }
}

impl TryFrom<u8> for CacheLayer {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Self::Metadata),
            2 => Ok(Self::Processed),
            3 => Ok(Self::Raw),
            other => Err(Error::configuration(format!(
                "cache layer must be 1, 2 or 3, got {other}"
            ))),
        }
    }
}

impl fmt::Display for CacheLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::Processed => "processed",
            Self::Raw => "raw",
        };
        write!(f, "{} ({name})", self.number())
    }
}

/// Storage footprint of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Estimated bytes held by layer 1 (UTF-16 code units x 2)
    pub layer1_size: usize,
    /// Estimated bytes held by layer 2
    pub layer2_size: usize,
    /// Whether layer 3 holds a current-version record
    pub layer3_has_data: bool,
    /// Tasks in layer 3
    pub layer3_task_count: usize,
    /// Last sync recorded in layer 1
    pub last_sync: Option<DateTime<Utc>>,
}

/// Freshness summary for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    /// Layer 1 holds a current record
    pub has_metadata: bool,
    /// Layer 2 holds a current record
    pub has_processed_data: bool,
    /// Layer 3 holds a current record
    pub has_raw_data: bool,
    /// Last successful sync
    pub last_sync: Option<DateTime<Utc>>,
    /// Seconds since the last sync
    pub age_seconds: Option<i64>,
    /// Tasks counted at the last sync
    pub task_count: usize,
    /// Format version the manager reads and writes
    pub version: String,
}

/// Borrowed layer 3 record, avoids cloning the task list on save
#[derive(Serialize)]
struct RawTaskRecordRef<'a> {
    tasks: &'a [Task],
    timestamp: DateTime<Utc>,
    version: &'a str,
    count: usize,
}

/// Version stamped into a record, empty when missing
fn record_version(record: &serde_json::Map<String, Value>) -> &str {
    record
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Cache layer manager
///
/// Construct one per application (or per test) and share it by reference.
pub struct CacheManager {
    sync_store: Arc<dyn SyncStore>,
    async_store: Arc<dyn AsyncStore>,
    config: CacheConfig,
    codec: Codec,
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    /// Create a manager over the given stores
    #[must_use]
    pub fn new(
        sync_store: Arc<dyn SyncStore>,
        async_store: Arc<dyn AsyncStore>,
        config: CacheConfig,
    ) -> Self {
        let codec = Codec::new(config.compression_level);
        Self {
            sync_store,
            async_store,
            config,
            codec,
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Format version records must carry
    #[must_use]
    pub fn version(&self) -> &str {
        &self.config.version
    }

    // ------------------------------------------------------------------
    // Shared record handling
    // ------------------------------------------------------------------

    /// Check the version of a parsed record and decode it
    fn decode_versioned<T: DeserializeOwned>(&self, key: &str, value: Value) -> Result<T> {
        let Some(found) = value.as_object().map(record_version) else {
            return Err(Error::serialization(format!("record '{key}' is not an object")));
        };
        if found != self.config.version {
            return Err(Error::version_mismatch(key, found, &self.config.version));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::serialization(format!("record '{key}' is malformed: {e}")))
    }

    /// Read and decode a sync-store record, `Ok(None)` when absent
    fn read_sync<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.sync_store.get(key)? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| Error::serialization(format!("record '{key}' is not JSON: {e}")))?;
        self.decode_versioned(key, value).map(Some)
    }

    /// Read without self-healing: stale or broken records read as absent
    fn peek_sync<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read_sync(key).ok().flatten()
    }

    /// Remove a sync-store key, logging instead of failing
    fn discard_sync(&self, key: &str) {
        if let Err(e) = self.sync_store.remove(key) {
            tracing::warn!(key, error = %e, "Failed to remove cache key");
        }
    }

    /// Estimated bytes stored under a sync-store key
    fn stored_size(&self, key: &str) -> usize {
        match self.sync_store.get(key) {
            Ok(Some(raw)) => utf16_byte_len(&raw),
            Ok(None) => 0,
            Err(e) => {
                tracing::debug!(key, error = %e, "Could not size cache key");
                0
            }
        }
    }

    // ------------------------------------------------------------------
    // Layer 1: metadata
    // ------------------------------------------------------------------

    /// Persist facet metadata for a sync that covered `task_count` tasks.
    ///
    /// Returns whether the record was written. On failure the previous
    /// record stays in place.
    pub fn save_metadata(&self, metadata: &FilterMetadata, task_count: usize) -> bool {
        let record = MetadataRecord {
            version: self.config.version.clone(),
            last_sync: Utc::now(),
            task_count,
            facets: metadata.clone(),
        };
        match self.write_metadata(&record) {
            Ok(()) => {
                tracing::debug!(layer = 1, task_count, "Saved metadata");
                true
            }
            Err(e) => {
                tracing::warn!(layer = 1, error = %e, "Metadata save skipped");
                false
            }
        }
    }

    fn write_metadata(&self, record: &MetadataRecord) -> Result<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| Error::serialization(format!("Failed to serialize metadata: {e}")))?;
        self.sync_store.set(&self.config.keys.metadata, &json)?;
        Ok(())
    }

    /// Load layer 1, removing it if stale or malformed
    pub fn load_metadata(&self) -> Option<MetadataRecord> {
        let key = &self.config.keys.metadata;
        match self.read_sync(key) {
            Ok(record) => record,
            Err(e) if e.is_bad_record() => {
                tracing::warn!(layer = 1, error = %e, "Discarding metadata record");
                self.discard_sync(key);
                None
            }
            Err(e) => {
                tracing::warn!(layer = 1, error = %e, "Metadata unreadable, treating as miss");
                None
            }
        }
    }

    /// Remove layer 1
    pub fn clear_metadata(&self) {
        self.discard_sync(&self.config.keys.metadata);
    }

    // ------------------------------------------------------------------
    // Layer 2: processed
    // ------------------------------------------------------------------

    /// Compress and persist grouped views.
    ///
    /// On any failure the layer is cleared, so a present record always
    /// holds a decodable payload.
    pub fn save_processed_data(&self, groups: &[GroupedData]) -> bool {
        match self.write_processed(groups) {
            Ok(bytes) => {
                tracing::debug!(layer = 2, groups = groups.len(), bytes, "Saved processed data");
                true
            }
            Err(e) => {
                tracing::warn!(layer = 2, error = %e, "Processed save failed, clearing layer");
                self.clear_processed_data();
                false
            }
        }
    }

    fn write_processed(&self, groups: &[GroupedData]) -> Result<usize> {
        let json = serde_json::to_string(groups)
            .map_err(|e| Error::serialization(format!("Failed to serialize groups: {e}")))?;
        let record = ProcessedRecord {
            version: self.config.version.clone(),
            timestamp: Utc::now(),
            compressed_payload: self.codec.compress(&json)?,
        };
        let envelope = serde_json::to_string(&record)
            .map_err(|e| Error::serialization(format!("Failed to serialize envelope: {e}")))?;

        // Drop the two-key format's blob first so it does not count against the quota
        self.discard_sync(&self.config.keys.processed_data);
        self.sync_store.set(&self.config.keys.processed, &envelope)?;
        Ok(utf16_byte_len(&envelope))
    }

    /// Load layer 2; a stale, malformed or undecodable record clears the layer
    pub fn load_processed_data(&self) -> Option<Vec<GroupedData>> {
        match self.read_processed() {
            Ok(groups) => groups,
            Err(e) if e.is_bad_record() => {
                tracing::warn!(layer = 2, error = %e, "Discarding processed data");
                self.clear_processed_data();
                None
            }
            Err(e) => {
                tracing::warn!(layer = 2, error = %e, "Processed data unreadable, treating as miss");
                None
            }
        }
    }

    fn read_processed(&self) -> Result<Option<Vec<GroupedData>>> {
        let key = &self.config.keys.processed;
        let Some(record) = self.read_sync::<ProcessedRecord>(key)? else {
            return Ok(None);
        };
        let json = self
            .codec
            .decompress(&record.compressed_payload)
            .ok_or_else(|| Error::Decompression { key: key.clone() })?;
        let groups = serde_json::from_str(&json)
            .map_err(|e| Error::serialization(format!("processed payload is malformed: {e}")))?;
        Ok(Some(groups))
    }

    /// Remove layer 2, including the legacy blob key
    pub fn clear_processed_data(&self) {
        self.discard_sync(&self.config.keys.processed);
        self.discard_sync(&self.config.keys.processed_data);
    }

    // ------------------------------------------------------------------
    // Layer 3: raw
    // ------------------------------------------------------------------

    /// Persist the canonical task list
    pub async fn save_raw_data(&self, tasks: &[Task]) -> bool {
        let record = RawTaskRecordRef {
            tasks,
            timestamp: Utc::now(),
            version: &self.config.version,
            count: tasks.len(),
        };
        let value = match serde_json::to_value(&record) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(layer = 3, error = %e, "Failed to serialize raw data");
                return false;
            }
        };
        match self.async_store.set(&self.config.keys.raw_data, value).await {
            Ok(()) => {
                tracing::debug!(layer = 3, count = tasks.len(), "Saved raw data");
                true
            }
            Err(e) => {
                tracing::error!(layer = 3, error = %e, "Raw data save failed");
                false
            }
        }
    }

    /// Load the canonical task list, removing it if stale or malformed.
    ///
    /// A store that fails to read leaves the document in place.
    pub async fn load_raw_data(&self) -> Option<Vec<Task>> {
        match self.read_raw().await {
            Ok(record) => record.map(|r| r.tasks),
            Err(e) if e.is_bad_record() => {
                tracing::warn!(layer = 3, error = %e, "Discarding raw data");
                self.clear_raw_data().await;
                None
            }
            Err(e) => {
                tracing::warn!(layer = 3, error = %e, "Raw data unreadable, treating as miss");
                None
            }
        }
    }

    async fn read_raw(&self) -> Result<Option<RawTaskRecord>> {
        let key = &self.config.keys.raw_data;
        let Some(value) = self.async_store.get(key).await? else {
            return Ok(None);
        };
        self.decode_versioned(key, value).map(Some)
    }

    /// Remove layer 3
    pub async fn clear_raw_data(&self) {
        if let Err(e) = self.async_store.delete(&self.config.keys.raw_data).await {
            tracing::warn!(layer = 3, error = %e, "Failed to remove raw data");
        }
    }

    // ------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------

    /// Merge an incremental delta over the cached raw list by task id.
    ///
    /// Does not persist the result. With no cached raw data the delta is
    /// returned unchanged.
    pub async fn merge_incremental_update(&self, new_tasks: Vec<Task>) -> Vec<Task> {
        self.merge_incremental_update_with(new_tasks, MergeOptions::default())
            .await
            .tasks
    }

    /// [`Self::merge_incremental_update`] with options and counters
    pub async fn merge_incremental_update_with(
        &self,
        new_tasks: Vec<Task>,
        options: MergeOptions,
    ) -> MergeReport {
        let cached = self.load_raw_data().await;
        let first_sync = cached.is_none();
        let report = merge_with_options(cached, new_tasks, options);
        tracing::info!(
            first_sync,
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            total = report.tasks.len(),
            "Merged incremental update"
        );
        report
    }

    // ------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------

    /// Remove one layer
    pub async fn clear_layer(&self, layer: CacheLayer) {
        match layer {
            CacheLayer::Metadata => self.clear_metadata(),
            CacheLayer::Processed => self.clear_processed_data(),
            CacheLayer::Raw => self.clear_raw_data().await,
        }
        tracing::info!(%layer, "Cleared cache layer");
    }

    /// Remove every layer and every legacy key
    pub async fn clear_all(&self) {
        for layer in CacheLayer::ALL {
            self.clear_layer(layer).await;
        }
        for key in LEGACY_KEYS {
            self.discard_sync(key);
        }
        tracing::info!("Cleared all cache layers and legacy keys");
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Layer 3 presence and task count, without self-healing
    async fn peek_raw(&self) -> Option<usize> {
        let value = self
            .async_store
            .get(&self.config.keys.raw_data)
            .await
            .ok()
            .flatten()?;
        if value.as_object().map(record_version) != Some(self.config.version.as_str()) {
            return None;
        }
        value
            .get("count")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .or_else(|| value.get("tasks").and_then(Value::as_array).map(Vec::len))
    }

    /// Timestamp of the last sync recorded in layer 1
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.peek_sync::<MetadataRecord>(&self.config.keys.metadata)
            .map(|m| m.last_sync)
    }

    /// Storage footprint per layer. Read-only.
    pub async fn get_cache_stats(&self) -> CacheStats {
        let raw_count = self.peek_raw().await;
        CacheStats {
            layer1_size: self.stored_size(&self.config.keys.metadata),
            layer2_size: self.stored_size(&self.config.keys.processed)
                + self.stored_size(&self.config.keys.processed_data),
            layer3_has_data: raw_count.is_some(),
            layer3_task_count: raw_count.unwrap_or(0),
            last_sync: self.last_sync(),
        }
    }

    /// Presence and freshness of each layer. Read-only.
    pub async fn get_cache_status(&self) -> CacheStatus {
        let metadata = self.peek_sync::<MetadataRecord>(&self.config.keys.metadata);
        let processed = self.peek_sync::<ProcessedRecord>(&self.config.keys.processed);
        let raw_count = self.peek_raw().await;

        let last_sync = metadata.as_ref().map(|m| m.last_sync);
        CacheStatus {
            has_metadata: metadata.is_some(),
            has_processed_data: processed.is_some(),
            has_raw_data: raw_count.is_some(),
            last_sync,
            age_seconds: last_sync.map(|t| (Utc::now() - t).num_seconds()),
            task_count: metadata
                .map(|m| m.task_count)
                .or(raw_count)
                .unwrap_or(0),
            version: self.config.version.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Scan legacy keys for data written by older cache formats
    pub fn try_recover_from_old_cache(&self) -> RecoveredCache {
        recover_from_legacy(self.sync_store.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyflow_store::{MemoryAsyncStore, MemorySyncStore};

    fn manager() -> CacheManager {
        CacheManager::new(
            Arc::new(MemorySyncStore::new()),
            Arc::new(MemoryAsyncStore::new()),
            CacheConfig::default(),
        )
    }

    #[test]
    fn test_layer_numbers() {
        for layer in CacheLayer::ALL {
            assert_eq!(CacheLayer::try_from(layer.number()).unwrap(), layer);
        }
        assert!(CacheLayer::try_from(0).is_err());
        assert!(CacheLayer::try_from(4).is_err());
        assert_eq!(CacheLayer::Processed.to_string(), "2 (processed)");
    }

    #[test]
    fn test_decode_rejects_missing_version() {
        let m = manager();
        let err = m
            .decode_versioned::<MetadataRecord>("k", serde_json::json!({"taskCount": 1}))
            .unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { ref found, .. } if found.is_empty()));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let m = manager();
        let err = m
            .decode_versioned::<MetadataRecord>("k", serde_json::json!([1, 2]))
            .unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_empty_cache_status() {
        let status = manager().get_cache_status().await;
        assert!(!status.has_metadata);
        assert!(!status.has_processed_data);
        assert!(!status.has_raw_data);
        assert_eq!(status.last_sync, None);
        assert_eq!(status.age_seconds, None);
        assert_eq!(status.task_count, 0);
        assert_eq!(status.version, "3.0.0");
    }
}
