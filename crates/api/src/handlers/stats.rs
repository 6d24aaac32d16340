//! Aggregate and per-user statistics.

use axum::extract::State;
use axum::Json;

use calcmark_core::stats::{AggregateStats, UserStat};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/stats -- service-wide aggregate counters.
pub async fn aggregate_stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AggregateStats>>> {
    let stats = state.store().aggregate().await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/stats/users -- per-user counters, most active first.
pub async fn user_stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserStat>>>> {
    let users = state.store().user_stats().await?;
    Ok(Json(DataResponse { data: users }))
}
