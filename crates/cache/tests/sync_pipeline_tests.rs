//! End-to-end sync passes over the file-backed stores

#![allow(clippy::unwrap_used)]

use dailyflow_cache::{
    CacheConfig, CacheManager, Container, MergeOptions, SyncMode, SyncPipeline, Tag, Task,
    TaskStatus,
};
use async_trait::async_trait;
use dailyflow_store::{AsyncStore, FileAsyncStore, FileSyncStore, MemorySyncStore, StoreError};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

fn open(dir: &Path) -> CacheManager {
    CacheManager::new(
        Arc::new(FileSyncStore::open(dir.join("local_storage.json")).unwrap()),
        Arc::new(FileAsyncStore::new(dir.join("raw"))),
        CacheConfig::default(),
    )
}

fn task(id: &str, name: &str, status: &str, list: &str) -> Task {
    Task {
        status: Some(TaskStatus {
            status: status.into(),
            ..Default::default()
        }),
        list: Some(Container {
            id: format!("l-{list}"),
            name: list.into(),
            ..Default::default()
        }),
        date_updated: Some("1700000000000".into()),
        ..Task::new(id, name)
    }
}

#[tokio::test]
async fn test_full_then_incremental_sync() {
    let tmp = TempDir::new().unwrap();
    let manager = open(tmp.path());
    let pipeline = SyncPipeline::new(&manager);

    let full = pipeline
        .apply(
            vec![
                task("1", "Draft plan", "open", "Backlog"),
                task("2", "Review PR", "review", "Doing"),
            ],
            SyncMode::Full,
        )
        .await;
    assert!(full.is_complete());
    assert_eq!(full.total, 2);
    assert_eq!(full.groups, 2);

    let mut closed = task("2", "Review PR", "closed", "Doing");
    closed.date_updated = Some("1700000009999".into());
    let delta = pipeline
        .apply(
            vec![closed, task("3", "Deploy", "open", "Doing")],
            SyncMode::Incremental,
        )
        .await;
    assert!(delta.is_complete());
    assert_eq!(delta.fetched, 2);
    assert_eq!(delta.updated, 1);
    assert_eq!(delta.inserted, 1);
    assert_eq!(delta.total, 3);

    let metadata = manager.load_metadata().unwrap();
    assert_eq!(metadata.task_count, 3);
    assert!(metadata.facets.statuses.contains("closed"));
    assert!(!metadata.facets.statuses.contains("review"));

    let groups = manager.load_processed_data().unwrap();
    let doing = groups.iter().find(|g| g.list_name == "Doing").unwrap();
    assert_eq!(doing.tasks.len(), 2);
}

#[tokio::test]
async fn test_cache_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    {
        let manager = open(tmp.path());
        let outcome = SyncPipeline::new(&manager)
            .apply(vec![task("1", "Persist me", "open", "Inbox")], SyncMode::Full)
            .await;
        assert!(outcome.is_complete());
    }

    let manager = open(tmp.path());
    let raw = manager.load_raw_data().await.unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].name, "Persist me");
    assert!(manager.load_processed_data().is_some());
    assert!(manager.last_sync().is_some());

    let stats = manager.get_cache_stats().await;
    assert!(stats.layer1_size > 0);
    assert!(stats.layer2_size > 0);
    assert_eq!(stats.layer3_task_count, 1);
}

#[tokio::test]
async fn test_full_sync_drops_tasks_deleted_upstream() {
    let tmp = TempDir::new().unwrap();
    let manager = open(tmp.path());
    let pipeline = SyncPipeline::new(&manager);

    pipeline
        .apply(
            vec![task("1", "Keep", "open", "A"), task("2", "Gone", "open", "A")],
            SyncMode::Full,
        )
        .await;

    // Incremental passes never remove tasks
    let delta = pipeline.apply(Vec::new(), SyncMode::Incremental).await;
    assert_eq!(delta.total, 2);

    let full = pipeline
        .apply(vec![task("1", "Keep", "open", "A")], SyncMode::Full)
        .await;
    assert_eq!(full.total, 1);
    assert_eq!(manager.load_raw_data().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_verified_incremental_skips_unchanged() {
    let tmp = TempDir::new().unwrap();
    let manager = open(tmp.path());

    let mut original = task("1", "Tagged", "open", "A");
    original.tags = vec![Tag {
        name: "infra".into(),
        ..Default::default()
    }];
    SyncPipeline::new(&manager)
        .apply(vec![original.clone()], SyncMode::Full)
        .await;

    let outcome = SyncPipeline::new(&manager)
        .with_merge_options(MergeOptions {
            verify_changes: true,
        })
        .apply(vec![original], SyncMode::Incremental)
        .await;
    assert_eq!(outcome.unchanged, 1);
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.total, 1);
}

/// File documents whose writes can be switched off mid-test
struct FlakyDocuments {
    inner: FileAsyncStore,
    fail_writes: AtomicBool,
}

#[async_trait]
impl AsyncStore for FlakyDocuments {
    async fn get(&self, key: &str) -> dailyflow_store::Result<Option<Value>> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: Value) -> dailyflow_store::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("disk full"));
        }
        self.inner.set(key, value).await
    }
    async fn delete(&self, key: &str) -> dailyflow_store::Result<()> {
        self.inner.delete(key).await
    }
}

#[tokio::test]
async fn test_failed_raw_save_keeps_last_sync() {
    let tmp = TempDir::new().unwrap();
    let documents = Arc::new(FlakyDocuments {
        inner: FileAsyncStore::new(tmp.path().join("raw")),
        fail_writes: AtomicBool::new(false),
    });
    let manager = CacheManager::new(
        Arc::new(MemorySyncStore::new()),
        documents.clone(),
        CacheConfig::default(),
    );
    let pipeline = SyncPipeline::new(&manager);

    let full = pipeline
        .apply(vec![task("1", "First", "open", "A")], SyncMode::Full)
        .await;
    assert!(full.is_complete());
    let synced_at = manager.last_sync().unwrap();
    let groups_before = manager.load_processed_data().unwrap();

    documents.fail_writes.store(true, Ordering::SeqCst);
    let delta = pipeline
        .apply(vec![task("2", "Second", "open", "B")], SyncMode::Incremental)
        .await;
    assert!(!delta.raw_saved);
    assert!(!delta.metadata_saved);
    assert!(!delta.processed_saved);
    assert!(!delta.is_complete());

    // The delta stays outside the modified-since window of the next pass
    assert_eq!(manager.last_sync(), Some(synced_at));
    assert_eq!(manager.load_metadata().unwrap().task_count, 1);
    assert_eq!(manager.load_processed_data().unwrap(), groups_before);
    let raw = manager.load_raw_data().await.unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].id, "1");

    documents.fail_writes.store(false, Ordering::SeqCst);
    let retry = pipeline
        .apply(vec![task("2", "Second", "open", "B")], SyncMode::Incremental)
        .await;
    assert!(retry.is_complete());
    assert_eq!(retry.total, 2);
    assert_eq!(manager.load_metadata().unwrap().task_count, 2);
}
