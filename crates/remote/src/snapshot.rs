//! Secondary (snapshot-oriented) remote store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RemoteResult;

/// The three independently snapshot-able collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Annotations,
    Users,
    Images,
}

impl Collection {
    pub const ALL: [Collection; 3] =
        [Collection::Annotations, Collection::Users, Collection::Images];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Annotations => "annotations",
            Collection::Users => "users",
            Collection::Images => "images",
        }
    }

    /// Blob name for this collection's snapshot.
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Annotations => "annotations.json",
            Collection::Users => "users.json",
            Collection::Images => "images.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set of the secondary remote tier: coarse-grained backup and
/// restore of whole collections as single JSON blobs.
///
/// Concurrent snapshot writers are tolerated: the last write wins, there is
/// no merge.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Overwrite the snapshot for one collection.
    async fn sync_snapshot(
        &self,
        collection: Collection,
        data: &serde_json::Value,
    ) -> RemoteResult<()>;

    /// Fetch the snapshot for one collection; `None` when never written.
    async fn load_snapshot(&self, collection: Collection) -> RemoteResult<Option<serde_json::Value>>;

    /// Delete every snapshot (administrative wipe).
    async fn clear(&self) -> RemoteResult<()>;
}

/// Secondary adapter with explicit unavailability (same contract as
/// [`PrimaryRemote`](crate::document::PrimaryRemote)).
#[derive(Clone)]
pub enum SecondaryRemote {
    Available(Arc<dyn SnapshotStore>),
    Unavailable,
}

impl SecondaryRemote {
    pub fn is_available(&self) -> bool {
        matches!(self, SecondaryRemote::Available(_))
    }

    /// Push a snapshot; returns `false` when no secondary store is
    /// configured (skipped, not failed).
    pub async fn sync_snapshot(
        &self,
        collection: Collection,
        data: &serde_json::Value,
    ) -> RemoteResult<bool> {
        match self {
            SecondaryRemote::Available(store) => {
                store.sync_snapshot(collection, data).await?;
                Ok(true)
            }
            SecondaryRemote::Unavailable => Ok(false),
        }
    }

    /// Fetch a snapshot; `Ok(None)` when unconfigured or never written.
    pub async fn load_snapshot(
        &self,
        collection: Collection,
    ) -> RemoteResult<Option<serde_json::Value>> {
        match self {
            SecondaryRemote::Available(store) => store.load_snapshot(collection).await,
            SecondaryRemote::Unavailable => Ok(None),
        }
    }

    /// Best-effort clear; no-op when no secondary store is configured.
    pub async fn clear(&self) -> RemoteResult<()> {
        match self {
            SecondaryRemote::Available(store) => store.clear().await,
            SecondaryRemote::Unavailable => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_stable() {
        assert_eq!(Collection::Annotations.as_str(), "annotations");
        assert_eq!(Collection::Users.file_name(), "users.json");
        assert_eq!(Collection::Images.to_string(), "images");
        assert_eq!(Collection::ALL.len(), 3);
    }

    #[tokio::test]
    async fn unavailable_secondary_is_a_noop() {
        let remote = SecondaryRemote::Unavailable;
        assert!(!remote.is_available());
        let pushed = remote
            .sync_snapshot(Collection::Annotations, &serde_json::json!([]))
            .await
            .unwrap();
        assert!(!pushed);
        assert!(remote
            .load_snapshot(Collection::Annotations)
            .await
            .unwrap()
            .is_none());
        remote.clear().await.unwrap();
    }
}
