//! Three-layer task cache for DailyFlow
//!
//! Mirrors ClickUp task data locally and re-syncs incrementally:
//! - Layer 1: facet metadata for filter pickers (sync store)
//! - Layer 2: compressed project/list groupings (sync store)
//! - Layer 3: the canonical raw task list (async store)
//!
//! # Overview
//!
//! A [`CacheManager`] is built explicitly over a pair of stores from
//! `dailyflow-store` and passed to whatever needs it. Records are stamped
//! with a format version; a mismatched, corrupt or undecodable record reads
//! as a miss and is removed.
//!
//! Incremental syncs merge a delta of modified tasks over the cached list by
//! task id (last writer wins, no tombstones). [`SyncPipeline`] runs a whole
//! pass: settle the raw list, then rebuild metadata and groupings from it.
//!
//! ```rust,no_run
//! use dailyflow_cache::{CacheConfig, CacheManager, SyncMode, SyncPipeline, Task};
//! use dailyflow_store::{MemoryAsyncStore, MemorySyncStore};
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let manager = CacheManager::new(
//!     Arc::new(MemorySyncStore::new()),
//!     Arc::new(MemoryAsyncStore::new()),
//!     CacheConfig::default(),
//! );
//! let outcome = SyncPipeline::new(&manager)
//!     .apply(vec![Task::new("86a1", "Ship release")], SyncMode::Full)
//!     .await;
//! assert!(outcome.is_complete());
//! let groups = manager.load_processed_data();
//! # }
//! ```

pub mod changes;
pub mod codec;
pub mod config;
mod error;
pub mod facets;
pub mod manager;
pub mod merge;
pub mod model;
pub mod recovery;
pub mod sync;

// Re-export error types at crate root
pub use error::{Error, Result};

// Re-export main types
pub use changes::has_task_changed;
pub use codec::Codec;
pub use config::{CACHE_VERSION, CacheConfig, CacheKeys};
pub use facets::{extract_filter_metadata, group_tasks};
pub use manager::{CacheLayer, CacheManager, CacheStats, CacheStatus};
pub use merge::{MergeOptions, MergeReport, merge_by_id, merge_with_options};
pub use model::{
    Assignee, Container, FilterMetadata, GroupedData, MetadataRecord, Priority, ProcessedRecord,
    RawTaskRecord, Tag, Task, TaskRef, TaskStatus,
};
pub use recovery::RecoveredCache;
pub use sync::{SyncMode, SyncOutcome, SyncPipeline};
