//! Integration tests for the local durable store.

use chrono::Utc;

use calcmark_core::annotation::{Annotation, Source};
use calcmark_core::mask::MaskReference;
use calcmark_core::types::new_annotation_id;
use calcmark_db::models::ListFilter;
use calcmark_db::{create_memory_pool, create_pool, run_migrations, LocalStore};

async fn memory_store() -> LocalStore {
    let pool = create_memory_pool().await.expect("memory pool");
    run_migrations(&pool).await.expect("migrations");
    LocalStore::new(pool)
}

fn annotation(user_id: &str, image_id: &str) -> Annotation {
    let now = Utc::now();
    Annotation {
        id: new_annotation_id(),
        image_id: image_id.to_string(),
        user_id: user_id.to_string(),
        source: Source::for_image_id(image_id),
        original_image: String::new(),
        mask: MaskReference::File {
            filename: format!("{image_id}-mask.png"),
        },
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn append_then_list_returns_new_record_first() {
    let store = memory_store().await;

    let first = annotation("user-1", "annotate-1");
    let second = annotation("user-1", "annotate-2");
    store.append(&first).await.unwrap();
    store.append(&second).await.unwrap();

    let listed = store.list(&ListFilter::default(), None).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[tokio::test]
async fn equal_timestamps_tie_break_by_insertion_order() {
    let store = memory_store().await;

    let now = Utc::now();
    let mut a = annotation("user-1", "annotate-1");
    let mut b = annotation("user-1", "annotate-2");
    a.created_at = now;
    a.updated_at = now;
    b.created_at = now;
    b.updated_at = now;

    store.append(&a).await.unwrap();
    store.append(&b).await.unwrap();

    let listed = store.list(&ListFilter::default(), None).await.unwrap();
    assert_eq!(listed[0].id, b.id, "later insertion wins the tie");
    assert_eq!(listed[1].id, a.id);
}

#[tokio::test]
async fn list_filters_by_user_and_image() {
    let store = memory_store().await;

    store.append(&annotation("alice", "annotate-1")).await.unwrap();
    store.append(&annotation("bob", "annotate-1")).await.unwrap();
    store.append(&annotation("alice", "test-9")).await.unwrap();

    let by_user = store
        .list(
            &ListFilter {
                user_id: Some("alice".into()),
                image_id: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_user.len(), 2);
    assert!(by_user.iter().all(|a| a.user_id == "alice"));

    let by_image = store
        .list(
            &ListFilter {
                user_id: None,
                image_id: Some("annotate-1".into()),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(by_image.len(), 2);
    assert!(by_image.iter().all(|a| a.image_id == "annotate-1"));

    let both = store
        .list(
            &ListFilter {
                user_id: Some("alice".into()),
                image_id: Some("annotate-1".into()),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
}

#[tokio::test]
async fn list_respects_limit() {
    let store = memory_store().await;
    for i in 0..5 {
        store
            .append(&annotation("user-1", &format!("annotate-{i}")))
            .await
            .unwrap();
    }
    let listed = store.list(&ListFilter::default(), Some(3)).await.unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn aggregate_counts_by_source() {
    let store = memory_store().await;

    store.append(&annotation("alice", "test-1")).await.unwrap();
    store.append(&annotation("alice", "annotate-1")).await.unwrap();
    store.append(&annotation("bob", "annotate-1")).await.unwrap();

    let stats = store.aggregate().await.unwrap();
    assert_eq!(stats.total_annotations, 3);
    assert_eq!(stats.unique_users, 2);
    assert_eq!(stats.annotated_images, 2);
    assert_eq!(stats.test_annotations, 1);
    assert_eq!(stats.direct_annotations, 2);
}

#[tokio::test]
async fn user_stats_ordered_by_total_desc() {
    let store = memory_store().await;

    for i in 0..3 {
        store
            .append(&annotation("alice", &format!("annotate-{i}")))
            .await
            .unwrap();
    }
    store.append(&annotation("bob", "annotate-0")).await.unwrap();

    let users = store.user_stats().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].user_id, "alice");
    assert_eq!(users[0].total_annotations, 3);
    assert_eq!(users[1].user_id, "bob");
    assert_eq!(users[1].total_annotations, 1);
    assert!(users[0].last_annotation_at >= users[0].first_annotation_at);
}

#[tokio::test]
async fn unregistered_image_gets_unknown_source() {
    let store = memory_store().await;
    store.append(&annotation("alice", "upload-7")).await.unwrap();

    let images = store.image_stats().await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image_id, "upload-7");
    assert_eq!(images[0].filename, "upload-7");
    assert_eq!(images[0].source, "unknown");
    assert_eq!(images[0].annotation_count, 1);
}

#[tokio::test]
async fn rebuild_matches_per_user_record_counts() {
    let store = memory_store().await;

    // Mixed sequence of saves across users, including zero for "carol".
    let users = ["alice", "alice", "bob", "alice", "bob"];
    for (i, user) in users.iter().enumerate() {
        store
            .append(&annotation(user, &format!("annotate-{i}")))
            .await
            .unwrap();
    }

    // Corrupt the counters, then rebuild.
    sqlx::query("UPDATE users SET total_annotations = 999")
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO users (user_id, first_annotation_at, last_annotation_at, total_annotations)
         VALUES ('carol', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z', 4)",
    )
    .execute(store.pool())
    .await
    .unwrap();

    store.rebuild_stats().await.unwrap();

    let stats = store.user_stats().await.unwrap();
    assert_eq!(stats.len(), 2, "user with no records is removed by rebuild");
    let alice = stats.iter().find(|u| u.user_id == "alice").unwrap();
    let bob = stats.iter().find(|u| u.user_id == "bob").unwrap();
    assert_eq!(alice.total_annotations, 3);
    assert_eq!(bob.total_annotations, 2);
}

#[tokio::test]
async fn rebuild_on_empty_log_clears_stats() {
    let store = memory_store().await;
    store.append(&annotation("alice", "annotate-1")).await.unwrap();
    sqlx::query("DELETE FROM annotations")
        .execute(store.pool())
        .await
        .unwrap();

    store.rebuild_stats().await.unwrap();
    assert!(store.user_stats().await.unwrap().is_empty());
    assert!(store.image_stats().await.unwrap().is_empty());
}

#[tokio::test]
async fn export_joins_current_stat_snapshots() {
    let store = memory_store().await;

    store.append(&annotation("alice", "annotate-1")).await.unwrap();
    store.append(&annotation("alice", "annotate-1")).await.unwrap();

    let exported = store.export_all().await.unwrap();
    assert_eq!(exported.len(), 2);
    for record in &exported {
        assert_eq!(record.user_total_annotations, 2);
        assert_eq!(record.image_total_annotations, 2);
    }
}

#[tokio::test]
async fn wipe_resets_everything() {
    let store = memory_store().await;

    store.append(&annotation("alice", "annotate-1")).await.unwrap();
    assert!(!store.is_empty().await.unwrap());

    store.wipe().await.unwrap();

    assert!(store.is_empty().await.unwrap());
    let stats = store.aggregate().await.unwrap();
    assert!(stats.is_empty());
    assert_eq!(stats.total_annotations, 0);
    assert!(store.list(&ListFilter::default(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_saves_lose_no_increments() {
    // File-backed database, saves issued from 50 parallel tasks.
    let dir = tempfile::tempdir().unwrap();
    let pool = create_pool(&dir.path().join("concurrent.db")).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let store = LocalStore::new(pool);

    let mut handles = Vec::new();
    for i in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .append(&annotation("user-1", &format!("annotate-{i}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let users = store.user_stats().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].total_annotations, 50);
    assert_eq!(store.count().await.unwrap(), 50);
}
