//! Environment-driven adapter configuration.
//!
//! Presence of credentials decides availability: `PRIMARY_STORE_URL` (plus
//! `PRIMARY_STORE_API_KEY`) enables the document adapter, `SNAPSHOT_BUCKET`
//! (plus ambient AWS credentials) enables the snapshot adapter. Either or
//! both may be absent; the unavailable tiers are logged once here and stay
//! silent no-ops afterwards.

use std::sync::Arc;

use crate::document::PrimaryRemote;
use crate::rest::RestDocumentStore;
use crate::s3::S3SnapshotStore;
use crate::snapshot::SecondaryRemote;

/// Upper bound on any single remote call, in seconds. A call that exceeds
/// it is treated as failed; replication never blocks indefinitely.
pub const REMOTE_TIMEOUT_SECS: u64 = 10;

/// Both remote tiers, resolved at process start.
#[derive(Clone)]
pub struct RemoteConfig {
    pub primary: PrimaryRemote,
    pub secondary: SecondaryRemote,
}

impl RemoteConfig {
    /// Resolve adapters from the environment.
    ///
    /// | Env Var                 | Enables                       |
    /// |-------------------------|-------------------------------|
    /// | `PRIMARY_STORE_URL`     | primary document adapter      |
    /// | `PRIMARY_STORE_API_KEY` | (auth for the primary)        |
    /// | `SNAPSHOT_BUCKET`       | secondary snapshot adapter    |
    /// | `SNAPSHOT_PREFIX`       | key prefix (default `calcmark`) |
    pub async fn from_env() -> Self {
        let primary = match std::env::var("PRIMARY_STORE_URL") {
            Ok(url) if !url.trim().is_empty() => {
                let api_key = std::env::var("PRIMARY_STORE_API_KEY").unwrap_or_default();
                match RestDocumentStore::new(url, api_key) {
                    Ok(store) => {
                        tracing::info!("Primary document store configured");
                        PrimaryRemote::Available(Arc::new(store))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Primary store configuration failed, continuing without it");
                        PrimaryRemote::Unavailable
                    }
                }
            }
            _ => {
                tracing::info!("Primary store credentials not found - local storage only for the document tier");
                PrimaryRemote::Unavailable
            }
        };

        let secondary = match std::env::var("SNAPSHOT_BUCKET") {
            Ok(bucket) if !bucket.trim().is_empty() => {
                let prefix =
                    std::env::var("SNAPSHOT_PREFIX").unwrap_or_else(|_| "calcmark".into());
                let aws_config = aws_config::load_from_env().await;
                let client = aws_sdk_s3::Client::new(&aws_config);
                tracing::info!(%bucket, %prefix, "Snapshot store configured");
                SecondaryRemote::Available(Arc::new(S3SnapshotStore::new(client, bucket, prefix)))
            }
            _ => {
                tracing::info!("Snapshot bucket not configured - no secondary backup tier");
                SecondaryRemote::Unavailable
            }
        };

        Self { primary, secondary }
    }

    /// Local-only configuration (both tiers unavailable).
    pub fn local_only() -> Self {
        Self {
            primary: PrimaryRemote::Unavailable,
            secondary: SecondaryRemote::Unavailable,
        }
    }
}
