//! Replication coordinator.
//!
//! The write path: persist locally (synchronous, the only step the caller
//! waits for), then push the record to the primary document tier and refresh
//! the secondary snapshots on a detached background task. Remote failures
//! are bounded by a timeout, logged, and recorded in the status log; they
//! are never retried and never fail the save. Once the save returns, the
//! background work cannot be cancelled, only allowed to fail on its own.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use calcmark_core::annotation::Annotation;
use calcmark_core::mask::{MaskReference, MaskStats};
use calcmark_core::types::AnnotationId;
use calcmark_db::models::ListFilter;
use calcmark_db::LocalStore;
use calcmark_remote::config::REMOTE_TIMEOUT_SECS;
use calcmark_remote::{Collection, PrimaryRemote, RemoteConfig, SecondaryRemote};

use crate::status::{ReplicationLog, WriteState};

/// Effective "no limit" when gathering collections for a snapshot.
const FULL_EXPORT_LIMIT: i64 = i64::MAX;

/// Which tier acknowledged a write at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Primary,
    Secondary,
    Local,
}

impl StorageTier {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageTier::Primary => "primary",
            StorageTier::Secondary => "secondary",
            StorageTier::Local => "local",
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveReceipt {
    pub id: AnnotationId,
    pub storage_tier: StorageTier,
}

/// Best-effort clear statuses for the administrative wipe.
#[derive(Debug, Clone, Serialize)]
pub struct WipeOutcome {
    pub primary_cleared: bool,
    pub secondary_cleared: bool,
}

/// Coordinates the local commit and the background remote pushes.
#[derive(Clone)]
pub struct Replicator {
    store: LocalStore,
    primary: PrimaryRemote,
    secondary: SecondaryRemote,
    log: Arc<ReplicationLog>,
}

impl Replicator {
    pub fn new(store: LocalStore, remote: RemoteConfig, log: Arc<ReplicationLog>) -> Self {
        Self {
            store,
            primary: remote.primary,
            secondary: remote.secondary,
            log,
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn log(&self) -> &Arc<ReplicationLog> {
        &self.log
    }

    pub fn primary_available(&self) -> bool {
        self.primary.is_available()
    }

    pub fn secondary_available(&self) -> bool {
        self.secondary.is_available()
    }

    /// Persist an annotation and kick off background replication.
    ///
    /// Returns once the local commit is durable. `mask_stats` is the lossy
    /// down-sampled mask summary pushed to the payload-limited primary tier
    /// in place of the raw pixel reference.
    pub async fn save(
        &self,
        annotation: Annotation,
        mask_stats: MaskStats,
    ) -> Result<SaveReceipt, sqlx::Error> {
        self.log
            .record(annotation.id, WriteState::LocalPending, None);
        let id = self.store.append(&annotation).await?;
        self.log.record(id, WriteState::LocalCommitted, None);

        let storage_tier = if self.primary.is_available() {
            StorageTier::Primary
        } else if self.secondary.is_available() {
            StorageTier::Secondary
        } else {
            StorageTier::Local
        };

        // Remote copy carries the summary instead of the raw pixel reference.
        let mut remote_copy = annotation;
        if matches!(remote_copy.mask, MaskReference::File { .. }) {
            remote_copy.mask = MaskReference::Stats(mask_stats);
        }

        let replicator = self.clone();
        tokio::spawn(async move {
            replicator.replicate(remote_copy).await;
        });

        Ok(SaveReceipt { id, storage_tier })
    }

    /// Background half of a write: primary push, then snapshot refresh.
    async fn replicate(&self, record: Annotation) {
        let id = record.id;

        if self.primary.is_available() {
            self.log.record(id, WriteState::RemotePrimaryPending, None);
            match with_timeout(self.primary.save_annotation(&record)).await {
                Ok(remote_id) => {
                    tracing::debug!(annotation_id = %id, remote_id = ?remote_id, "Primary replication ok");
                    self.log.record(id, WriteState::RemotePrimaryOk, None);
                }
                Err(detail) => {
                    tracing::warn!(annotation_id = %id, %detail, "Primary replication failed");
                    self.log
                        .record(id, WriteState::RemotePrimaryFailed, Some(detail));
                }
            }
        }

        if self.secondary.is_available() {
            self.log.record(id, WriteState::SnapshotPending, None);
            match self.push_snapshots().await {
                Ok(()) => {
                    self.log.record(id, WriteState::SnapshotOk, None);
                }
                Err(detail) => {
                    tracing::warn!(annotation_id = %id, %detail, "Snapshot backup failed");
                    self.log
                        .record(id, WriteState::SnapshotFailed, Some(detail));
                }
            }
        }
    }

    /// Serialize all three collections from the local store and overwrite
    /// the secondary tier's snapshots.
    async fn push_snapshots(&self) -> Result<(), String> {
        let annotations = self
            .store
            .list(&ListFilter::default(), Some(FULL_EXPORT_LIMIT))
            .await
            .map_err(|e| format!("read annotations: {e}"))?;
        let users = self
            .store
            .user_stats()
            .await
            .map_err(|e| format!("read users: {e}"))?;
        let images = self
            .store
            .image_stats()
            .await
            .map_err(|e| format!("read images: {e}"))?;

        let payloads = [
            (Collection::Annotations, serde_json::to_value(&annotations)),
            (Collection::Users, serde_json::to_value(&users)),
            (Collection::Images, serde_json::to_value(&images)),
        ];

        for (collection, payload) in payloads {
            let payload = payload.map_err(|e| format!("serialize {collection}: {e}"))?;
            with_timeout(self.secondary.sync_snapshot(collection, &payload)).await?;
        }
        Ok(())
    }

    /// Manual full snapshot push (admin operation).
    ///
    /// Returns `false` when no secondary tier is configured.
    pub async fn backup_now(&self) -> Result<bool, String> {
        if !self.secondary.is_available() {
            return Ok(false);
        }
        self.push_snapshots().await?;
        Ok(true)
    }

    /// Administrative wipe: clear local collections, then best-effort clear
    /// both remote tiers.
    ///
    /// Atomic from the operator's point of view; physically three separate
    /// steps, and a remote clear failure leaves that tier stale (reported,
    /// not retried).
    pub async fn wipe_all(&self) -> Result<WipeOutcome, sqlx::Error> {
        self.store.wipe().await?;
        tracing::info!("Local store wiped");

        let primary_cleared = match with_timeout(self.primary.clear()).await {
            Ok(()) => true,
            Err(detail) => {
                tracing::warn!(%detail, "Primary clear failed");
                false
            }
        };

        let secondary_cleared = match with_timeout(self.secondary.clear()).await {
            Ok(()) => true,
            Err(detail) => {
                tracing::warn!(%detail, "Secondary clear failed");
                false
            }
        };

        Ok(WipeOutcome {
            primary_cleared,
            secondary_cleared,
        })
    }
}

/// Bound a remote call by the adapter-wide timeout, flattening both the
/// elapsed case and the adapter error into a printable failure detail.
async fn with_timeout<T, E: std::fmt::Display>(
    fut: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, String> {
    match tokio::time::timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS), fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {REMOTE_TIMEOUT_SECS}s")),
    }
}
