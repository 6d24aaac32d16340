//! Primary (document-oriented) remote store.

use std::sync::Arc;

use async_trait::async_trait;

use calcmark_core::annotation::Annotation;
use calcmark_core::stats::AggregateStats;

use crate::error::RemoteResult;

/// Capability set of the primary remote tier: per-record saves with
/// generated remote identifiers, bulk reads, and server-side aggregation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Save one record, returning the remote document id.
    async fn save_annotation(&self, annotation: &Annotation) -> RemoteResult<String>;

    /// Load up to `limit` records, newest first.
    async fn load_all(&self, limit: i64) -> RemoteResult<Vec<Annotation>>;

    /// Server-side aggregate counts.
    async fn stats(&self) -> RemoteResult<AggregateStats>;

    /// Remove every stored record (administrative wipe).
    async fn clear(&self) -> RemoteResult<()>;
}

/// Primary adapter with explicit unavailability.
///
/// `Unavailable` means credentials were absent or authentication failed at
/// process start; it is a steady state, logged once, and every operation on
/// it is a no-op returning an empty result.
#[derive(Clone)]
pub enum PrimaryRemote {
    Available(Arc<dyn DocumentStore>),
    Unavailable,
}

impl PrimaryRemote {
    pub fn is_available(&self) -> bool {
        matches!(self, PrimaryRemote::Available(_))
    }

    /// Save a record; `Ok(None)` when no primary store is configured.
    pub async fn save_annotation(&self, annotation: &Annotation) -> RemoteResult<Option<String>> {
        match self {
            PrimaryRemote::Available(store) => store.save_annotation(annotation).await.map(Some),
            PrimaryRemote::Unavailable => Ok(None),
        }
    }

    /// Load records; empty when no primary store is configured.
    pub async fn load_all(&self, limit: i64) -> RemoteResult<Vec<Annotation>> {
        match self {
            PrimaryRemote::Available(store) => store.load_all(limit).await,
            PrimaryRemote::Unavailable => Ok(Vec::new()),
        }
    }

    /// Aggregate counts; `Ok(None)` when no primary store is configured.
    pub async fn stats(&self) -> RemoteResult<Option<AggregateStats>> {
        match self {
            PrimaryRemote::Available(store) => store.stats().await.map(Some),
            PrimaryRemote::Unavailable => Ok(None),
        }
    }

    /// Best-effort clear; no-op when no primary store is configured.
    pub async fn clear(&self) -> RemoteResult<()> {
        match self {
            PrimaryRemote::Available(store) => store.clear().await,
            PrimaryRemote::Unavailable => Ok(()),
        }
    }
}
