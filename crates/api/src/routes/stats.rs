//! Statistics routes.
//!
//! ```text
//! GET /stats         aggregate_stats
//! GET /stats/users   user_stats
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats::aggregate_stats))
        .route("/stats/users", get(stats::user_stats))
}
