//! In-memory adapter implementations.
//!
//! Used by the replication and recovery test suites, and handy as a stand-in
//! tier during local development. Both carry a failure toggle to simulate a
//! provider outage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use calcmark_core::annotation::Annotation;
use calcmark_core::stats::AggregateStats;

use crate::document::DocumentStore;
use crate::error::{RemoteError, RemoteResult};
use crate::snapshot::{Collection, SnapshotStore};

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<Vec<Annotation>>,
    fail: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed records (e.g. for recovery tests).
    pub fn seeded(annotations: Vec<Annotation>) -> Self {
        Self {
            documents: Mutex::new(annotations),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail, simulating an outage.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.documents.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> RemoteResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RemoteError::Http("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn save_annotation(&self, annotation: &Annotation) -> RemoteResult<String> {
        self.check()?;
        let mut documents = self.documents.lock().expect("lock poisoned");
        documents.push(annotation.clone());
        Ok(format!("doc-{}", documents.len()))
    }

    async fn load_all(&self, limit: i64) -> RemoteResult<Vec<Annotation>> {
        self.check()?;
        let documents = self.documents.lock().expect("lock poisoned");
        let mut all: Vec<Annotation> = documents.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }

    async fn stats(&self) -> RemoteResult<AggregateStats> {
        self.check()?;
        let documents = self.documents.lock().expect("lock poisoned");
        let unique_users: std::collections::HashSet<_> =
            documents.iter().map(|a| a.user_id.as_str()).collect();
        let unique_images: std::collections::HashSet<_> =
            documents.iter().map(|a| a.image_id.as_str()).collect();
        let test = documents
            .iter()
            .filter(|a| a.source == calcmark_core::annotation::Source::Test)
            .count() as i64;
        let total = documents.len() as i64;
        Ok(AggregateStats {
            total_annotations: total,
            unique_users: unique_users.len() as i64,
            annotated_images: unique_images.len() as i64,
            test_annotations: test,
            direct_annotations: total - test,
        })
    }

    async fn clear(&self) -> RemoteResult<()> {
        self.check()?;
        self.documents.lock().expect("lock poisoned").clear();
        Ok(())
    }
}

/// In-memory [`SnapshotStore`].
#[derive(Default)]
pub struct MemorySnapshotStore {
    blobs: Mutex<HashMap<Collection, serde_json::Value>>,
    fail: AtomicBool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Snapshot currently held for a collection.
    pub fn snapshot(&self, collection: Collection) -> Option<serde_json::Value> {
        self.blobs
            .lock()
            .expect("lock poisoned")
            .get(&collection)
            .cloned()
    }

    /// Pre-seed a collection snapshot.
    pub fn seed(&self, collection: Collection, data: serde_json::Value) {
        self.blobs
            .lock()
            .expect("lock poisoned")
            .insert(collection, data);
    }

    fn check(&self) -> RemoteResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(RemoteError::Storage("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn sync_snapshot(
        &self,
        collection: Collection,
        data: &serde_json::Value,
    ) -> RemoteResult<()> {
        self.check()?;
        // Last write wins, whole-blob overwrite.
        self.blobs
            .lock()
            .expect("lock poisoned")
            .insert(collection, data.clone());
        Ok(())
    }

    async fn load_snapshot(
        &self,
        collection: Collection,
    ) -> RemoteResult<Option<serde_json::Value>> {
        self.check()?;
        Ok(self.snapshot(collection))
    }

    async fn clear(&self) -> RemoteResult<()> {
        self.check()?;
        self.blobs.lock().expect("lock poisoned").clear();
        Ok(())
    }
}
