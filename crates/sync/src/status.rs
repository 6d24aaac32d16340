//! Per-write replication state machine and its bounded status log.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;

use calcmark_core::types::{AnnotationId, Timestamp};

/// States a single write moves through.
///
/// Everything after `LocalCommitted` is background and best-effort: a
/// failed transition is recorded and traced but never retried and never
/// rolls back the local commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteState {
    LocalPending,
    LocalCommitted,
    RemotePrimaryPending,
    RemotePrimaryOk,
    RemotePrimaryFailed,
    SnapshotPending,
    SnapshotOk,
    SnapshotFailed,
}

/// One recorded transition.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub annotation_id: AnnotationId,
    pub state: WriteState,
    /// Failure detail, present for the `*Failed` states.
    pub detail: Option<String>,
    pub at: Timestamp,
}

/// Default number of retained entries.
const DEFAULT_CAPACITY: usize = 256;

/// Bounded in-memory log of replication transitions.
///
/// Background replication failures land here (and in tracing) instead of
/// being thrown across the task boundary; the admin status endpoint exposes
/// the recent tail so operators can see silent-tier trouble.
pub struct ReplicationLog {
    entries: Mutex<VecDeque<StatusEntry>>,
    capacity: usize,
}

impl ReplicationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record a transition, dropping the oldest entry when full.
    pub fn record(&self, annotation_id: AnnotationId, state: WriteState, detail: Option<String>) {
        let mut entries = self.entries.lock().expect("lock poisoned");
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(StatusEntry {
            annotation_id,
            state,
            detail,
            at: chrono::Utc::now(),
        });
    }

    /// Recent entries, oldest first.
    pub fn entries(&self) -> Vec<StatusEntry> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .iter()
            .cloned()
            .collect()
    }

    /// Latest recorded state for one write, if still retained.
    pub fn last_state(&self, annotation_id: AnnotationId) -> Option<WriteState> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find(|e| e.annotation_id == annotation_id)
            .map(|e| e.state)
    }
}

impl Default for ReplicationLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
