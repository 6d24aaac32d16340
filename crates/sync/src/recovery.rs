//! Startup recovery.
//!
//! Decides whether the local store can be trusted or a remote snapshot must
//! be materialized before the process serves traffic. The policy is
//! deliberately coarse: an empty local store restores from whichever remote
//! tier holds more records; a non-empty local store always wins, even when a
//! remote holds strictly more (that case is logged as ambiguous, not
//! merged — partial stale local data is a documented gap, not something
//! recovery silently patches).

use serde::Serialize;

use calcmark_core::annotation::Annotation;
use calcmark_db::LocalStore;
use calcmark_remote::{Collection, PrimaryRemote, SecondaryRemote};

/// Upper bound on records pulled from the primary tier during restore.
const RESTORE_LIMIT: i64 = 10_000;

/// What recovery decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryDecision {
    /// Local store was non-empty; remote tiers were not consulted for data.
    UsedLocal,
    /// Local store was empty and the primary tier had the most records.
    RestoredFromPrimary,
    /// Local store was empty and the secondary snapshot had the most records.
    RestoredFromSecondary,
    /// Everything was empty; started fresh.
    StartedEmpty,
}

/// Outcome summary, logged and surfaced on the admin status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryReport {
    pub decision: RecoveryDecision,
    /// Records in the local store after recovery finished.
    pub local_records: i64,
    /// Records materialized from a remote tier (zero unless restored).
    pub restored_records: i64,
    /// Local data kept while an available remote held strictly more records.
    pub ambiguous: bool,
}

/// Run the startup restore decision. Must complete before serving traffic.
pub async fn recover(
    store: &LocalStore,
    primary: &PrimaryRemote,
    secondary: &SecondaryRemote,
) -> Result<RecoveryReport, sqlx::Error> {
    if !store.is_empty().await? {
        return keep_local(store, primary, secondary).await;
    }

    if !primary.is_available() && !secondary.is_available() {
        tracing::info!("No remote tiers configured - starting with empty local store");
        return Ok(RecoveryReport {
            decision: RecoveryDecision::StartedEmpty,
            local_records: 0,
            restored_records: 0,
            ambiguous: false,
        });
    }

    tracing::info!("Local store is empty - attempting restore from remote tiers");

    let from_primary = match primary.load_all(RESTORE_LIMIT).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Primary restore read failed");
            Vec::new()
        }
    };

    let from_secondary = load_secondary_annotations(secondary).await;

    // Primary wins ties; the secondary snapshot is used only when it is
    // strictly more complete.
    let (records, decision) = if from_secondary.len() > from_primary.len() {
        (from_secondary, RecoveryDecision::RestoredFromSecondary)
    } else {
        (from_primary, RecoveryDecision::RestoredFromPrimary)
    };

    if records.is_empty() {
        tracing::info!("No remote data found - initialized with empty store");
        return Ok(RecoveryReport {
            decision: RecoveryDecision::StartedEmpty,
            local_records: 0,
            restored_records: 0,
            ambiguous: false,
        });
    }

    store.restore(&records).await?;
    let restored = records.len() as i64;
    tracing::info!(records = restored, decision = ?decision, "Restored data from remote tier");

    Ok(RecoveryReport {
        decision,
        local_records: store.count().await?,
        restored_records: restored,
        ambiguous: false,
    })
}

/// Non-empty local store: trust it, but flag when an available remote tier
/// reports strictly more records.
async fn keep_local(
    store: &LocalStore,
    primary: &PrimaryRemote,
    secondary: &SecondaryRemote,
) -> Result<RecoveryReport, sqlx::Error> {
    let local_records = store.count().await?;

    let remote_records = if primary.is_available() {
        match primary.stats().await {
            Ok(stats) => stats.map(|s| s.total_annotations),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read primary stats during recovery check");
                None
            }
        }
    } else if secondary.is_available() {
        Some(load_secondary_annotations(secondary).await.len() as i64)
    } else {
        None
    };

    let ambiguous = match remote_records {
        Some(remote) if remote > local_records => {
            tracing::warn!(
                local_records,
                remote_records = remote,
                "Recovery ambiguous: remote tier has more records than local store; keeping local data (no merge)"
            );
            true
        }
        _ => false,
    };

    Ok(RecoveryReport {
        decision: RecoveryDecision::UsedLocal,
        local_records,
        restored_records: 0,
        ambiguous,
    })
}

/// Fetch and decode the secondary annotations snapshot; failures degrade to
/// an empty set.
async fn load_secondary_annotations(secondary: &SecondaryRemote) -> Vec<Annotation> {
    let value = match secondary.load_snapshot(Collection::Annotations).await {
        Ok(Some(value)) => value,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Secondary restore read failed");
            return Vec::new();
        }
    };

    match serde_json::from_value(value) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Secondary annotations snapshot did not parse");
            Vec::new()
        }
    }
}
