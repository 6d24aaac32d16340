//! Administrative operations: export, wipe, manual backup, replication
//! status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use calcmark_db::models::ExportRecord;
use calcmark_sync::status::StatusEntry;
use calcmark_sync::{RecoveryReport, WipeOutcome};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/admin/export -- full dump of every annotation joined with the
/// current stat snapshots.
pub async fn export_all(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ExportRecord>>>> {
    let records = state.store().export_all().await?;
    tracing::info!(records = records.len(), "Export requested");
    Ok(Json(DataResponse { data: records }))
}

/// DELETE /api/admin/annotations -- wipe every tier.
///
/// The local wipe is atomic; remote clears are best-effort and reported in
/// the response rather than retried.
pub async fn wipe_annotations(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<WipeOutcome>>> {
    let outcome = state.replicator.wipe_all().await?;
    tracing::warn!(
        primary_cleared = outcome.primary_cleared,
        secondary_cleared = outcome.secondary_cleared,
        "Administrative wipe completed"
    );
    Ok(Json(DataResponse { data: outcome }))
}

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    /// False when no snapshot tier is configured.
    pub triggered: bool,
}

/// POST /api/admin/backup -- push a full snapshot set to the secondary tier.
pub async fn backup_now(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BackupResponse>>> {
    let triggered = state
        .replicator
        .backup_now()
        .await
        .map_err(AppError::InternalError)?;
    Ok(Json(DataResponse {
        data: BackupResponse { triggered },
    }))
}

#[derive(Debug, Serialize)]
pub struct ReplicationStatus {
    pub primary_available: bool,
    pub secondary_available: bool,
    pub recovery: RecoveryReport,
    /// Most recent write-state transitions, oldest first.
    pub recent: Vec<StatusEntry>,
}

/// GET /api/admin/replication -- adapter availability, the startup recovery
/// report, and the recent write-state log.
pub async fn replication_status(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ReplicationStatus>>> {
    Ok(Json(DataResponse {
        data: ReplicationStatus {
            primary_available: state.replicator.primary_available(),
            secondary_available: state.replicator.secondary_available(),
            recovery: (*state.recovery).clone(),
            recent: state.replicator.log().entries(),
        },
    }))
}
