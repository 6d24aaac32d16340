//! Replication coordinator behaviour.

mod common;

use std::sync::Arc;

use calcmark_core::mask::MaskReference;
use calcmark_db::models::ListFilter;
use calcmark_remote::memory::{MemoryDocumentStore, MemorySnapshotStore};
use calcmark_remote::{Collection, DocumentStore, PrimaryRemote, RemoteConfig, SecondaryRemote};
use calcmark_sync::{ReplicationLog, Replicator, StorageTier, WriteState};

use common::{annotation, mask_stats, memory_store, wait_for};

fn replicator_with(
    store: calcmark_db::LocalStore,
    primary: PrimaryRemote,
    secondary: SecondaryRemote,
) -> Replicator {
    Replicator::new(
        store,
        RemoteConfig { primary, secondary },
        Arc::new(ReplicationLog::default()),
    )
}

#[tokio::test]
async fn save_with_no_remotes_reports_local_tier() {
    let store = memory_store().await;
    let replicator = replicator_with(
        store.clone(),
        PrimaryRemote::Unavailable,
        SecondaryRemote::Unavailable,
    );

    let receipt = replicator
        .save(annotation("alice", "annotate-1"), mask_stats())
        .await
        .unwrap();

    assert_eq!(receipt.storage_tier, StorageTier::Local);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn save_replicates_to_primary_in_background() {
    let store = memory_store().await;
    let primary = Arc::new(MemoryDocumentStore::new());
    let replicator = replicator_with(
        store,
        PrimaryRemote::Available(primary.clone()),
        SecondaryRemote::Unavailable,
    );

    let record = annotation("alice", "annotate-1");
    let id = record.id;
    let receipt = replicator.save(record, mask_stats()).await.unwrap();
    assert_eq!(receipt.storage_tier, StorageTier::Primary);

    wait_for(|| primary.len() == 1).await;
    wait_for(|| replicator.log().last_state(id) == Some(WriteState::RemotePrimaryOk)).await;
}

#[tokio::test]
async fn primary_copy_carries_downsampled_mask() {
    let store = memory_store().await;
    let primary = Arc::new(MemoryDocumentStore::new());
    let replicator = replicator_with(
        store.clone(),
        PrimaryRemote::Available(primary.clone()),
        SecondaryRemote::Unavailable,
    );

    replicator
        .save(annotation("alice", "annotate-1"), mask_stats())
        .await
        .unwrap();
    wait_for(|| primary.len() == 1).await;

    // Remote copy is the lossy summary; the local record keeps the file ref.
    let remote = primary.load_all(10).await.unwrap();
    assert!(matches!(remote[0].mask, MaskReference::Stats(_)));

    let local = store.list(&ListFilter::default(), None).await.unwrap();
    assert!(matches!(local[0].mask, MaskReference::File { .. }));
}

#[tokio::test]
async fn primary_outage_does_not_fail_the_save() {
    let store = memory_store().await;
    let primary = Arc::new(MemoryDocumentStore::new());
    primary.set_failing(true);
    let replicator = replicator_with(
        store.clone(),
        PrimaryRemote::Available(primary.clone()),
        SecondaryRemote::Unavailable,
    );

    let record = annotation("alice", "annotate-1");
    let id = record.id;
    let receipt = replicator.save(record, mask_stats()).await.unwrap();

    // Local commit succeeded even though the primary push will fail.
    assert_eq!(receipt.id, id);
    assert_eq!(store.count().await.unwrap(), 1);

    wait_for(|| replicator.log().last_state(id) == Some(WriteState::RemotePrimaryFailed)).await;
    assert!(primary.is_empty());

    // The failure left a detail in the status log, not just a trace line.
    let entries = replicator.log().entries();
    let failed = entries
        .iter()
        .find(|e| e.state == WriteState::RemotePrimaryFailed)
        .unwrap();
    assert!(failed.detail.is_some());
}

#[tokio::test]
async fn save_refreshes_secondary_snapshots() {
    let store = memory_store().await;
    let secondary = Arc::new(MemorySnapshotStore::new());
    let replicator = replicator_with(
        store,
        PrimaryRemote::Unavailable,
        SecondaryRemote::Available(secondary.clone()),
    );

    let record = annotation("alice", "annotate-1");
    let id = record.id;
    let receipt = replicator.save(record, mask_stats()).await.unwrap();
    assert_eq!(receipt.storage_tier, StorageTier::Secondary);

    wait_for(|| replicator.log().last_state(id) == Some(WriteState::SnapshotOk)).await;

    let annotations = secondary.snapshot(Collection::Annotations).unwrap();
    assert_eq!(annotations.as_array().unwrap().len(), 1);
    let users = secondary.snapshot(Collection::Users).unwrap();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert!(secondary.snapshot(Collection::Images).is_some());
}

#[tokio::test]
async fn snapshot_outage_is_logged_and_swallowed() {
    let store = memory_store().await;
    let secondary = Arc::new(MemorySnapshotStore::new());
    secondary.set_failing(true);
    let replicator = replicator_with(
        store.clone(),
        PrimaryRemote::Unavailable,
        SecondaryRemote::Available(secondary.clone()),
    );

    let record = annotation("alice", "annotate-1");
    let id = record.id;
    replicator.save(record, mask_stats()).await.unwrap();

    wait_for(|| replicator.log().last_state(id) == Some(WriteState::SnapshotFailed)).await;
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn backup_now_pushes_all_collections() {
    let store = memory_store().await;
    store.append(&annotation("alice", "annotate-1")).await.unwrap();
    store.append(&annotation("bob", "test-2")).await.unwrap();

    let secondary = Arc::new(MemorySnapshotStore::new());
    let replicator = replicator_with(
        store,
        PrimaryRemote::Unavailable,
        SecondaryRemote::Available(secondary.clone()),
    );

    assert!(replicator.backup_now().await.unwrap());
    let annotations = secondary.snapshot(Collection::Annotations).unwrap();
    assert_eq!(annotations.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn backup_now_without_secondary_is_skipped() {
    let store = memory_store().await;
    let replicator = replicator_with(store, PrimaryRemote::Unavailable, SecondaryRemote::Unavailable);
    assert!(!replicator.backup_now().await.unwrap());
}

#[tokio::test]
async fn wipe_clears_every_tier() {
    let store = memory_store().await;
    let primary = Arc::new(MemoryDocumentStore::new());
    let secondary = Arc::new(MemorySnapshotStore::new());
    secondary.seed(Collection::Annotations, serde_json::json!([1, 2, 3]));
    let replicator = replicator_with(
        store.clone(),
        PrimaryRemote::Available(primary.clone()),
        SecondaryRemote::Available(secondary.clone()),
    );

    let record = annotation("alice", "annotate-1");
    let id = record.id;
    replicator.save(record, mask_stats()).await.unwrap();
    // Wait out the whole background pipeline so the wipe cannot race a
    // lagging snapshot push.
    wait_for(|| replicator.log().last_state(id) == Some(WriteState::SnapshotOk)).await;
    assert_eq!(primary.len(), 1);

    let outcome = replicator.wipe_all().await.unwrap();
    assert!(outcome.primary_cleared);
    assert!(outcome.secondary_cleared);
    assert!(store.is_empty().await.unwrap());
    assert!(primary.is_empty());
    assert!(secondary.snapshot(Collection::Annotations).is_none());
}

#[tokio::test]
async fn wipe_survives_remote_clear_failure() {
    let store = memory_store().await;
    store.append(&annotation("alice", "annotate-1")).await.unwrap();

    let primary = Arc::new(MemoryDocumentStore::new());
    primary.set_failing(true);
    let replicator = replicator_with(
        store.clone(),
        PrimaryRemote::Available(primary),
        SecondaryRemote::Unavailable,
    );

    let outcome = replicator.wipe_all().await.unwrap();
    assert!(!outcome.primary_cleared);
    assert!(store.is_empty().await.unwrap(), "local wipe still happened");
}
