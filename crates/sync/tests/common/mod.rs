//! Shared fixtures for the replication and recovery suites.
#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;

use calcmark_core::annotation::{Annotation, Source};
use calcmark_core::mask::{MaskReference, MaskStats};
use calcmark_core::types::new_annotation_id;
use calcmark_db::{create_memory_pool, run_migrations, LocalStore};

pub async fn memory_store() -> LocalStore {
    let pool = create_memory_pool().await.expect("memory pool");
    run_migrations(&pool).await.expect("migrations");
    LocalStore::new(pool)
}

pub fn annotation(user_id: &str, image_id: &str) -> Annotation {
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

pub fn mask_stats() -> MaskStats {
    MaskStats {
        width: 16,
        height: 16,
        total_pixels: 256,
        annotated_pixels: 64,
        coverage_percent: 25.0,
    }
}

/// Poll until `check` passes or a couple of seconds elapse.
pub async fn wait_for(check: impl Fn() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("background replication did not reach the expected state");
}
