//! Cache manager configuration: format version and storage keys

use crate::codec::DEFAULT_COMPRESSION_LEVEL;
use serde::{Deserialize, Serialize};

/// Current cache format version
pub const CACHE_VERSION: &str = "3.0.0";

/// Layer 1 key
pub const METADATA_KEY: &str = "dailyFlow_metadata_v3";
/// Layer 2 key
pub const PROCESSED_KEY: &str = "dailyFlow_processed_v3";
/// Second key of the two-key processed format; only ever cleared
pub const PROCESSED_DATA_KEY: &str = "dailyFlow_processed_v3_data";
/// Layer 3 key
pub const RAW_DATA_KEY: &str = "dailyFlow_rawData_v3";

/// Keys written by pre-v3 cache formats, in recovery scan order
pub const LEGACY_KEYS: [&str; 3] = ["dailyFlowCachedData", "clickup_cache_data", "dailyFlowCacheMeta"];

/// Legacy key holding the old metadata/config blob
pub const LEGACY_META_KEY: &str = "dailyFlowCacheMeta";

/// Storage keys used by each layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheKeys {
    /// Layer 1 (sync store)
    pub metadata: String,
    /// Layer 2 (sync store)
    pub processed: String,
    /// Layer 2 legacy blob key (sync store)
    pub processed_data: String,
    /// Layer 3 (async store)
    pub raw_data: String,
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self {
            metadata: METADATA_KEY.to_string(),
            processed: PROCESSED_KEY.to_string(),
            processed_data: PROCESSED_DATA_KEY.to_string(),
            raw_data: RAW_DATA_KEY.to_string(),
        }
    }
}

/// Configuration for a [`CacheManager`](crate::CacheManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Version stamped into and required of every record
    pub version: String,
    /// Storage keys
    pub keys: CacheKeys,
    /// zstd level for the processed layer
    pub compression_level: i32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            keys: CacheKeys::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl CacheConfig {
    /// Default configuration with a different format version
    #[must_use]
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }
}
