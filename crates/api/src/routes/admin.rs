//! Administrative routes, nested under `/admin`.
//!
//! ```text
//! GET    /export        export_all
//! DELETE /annotations   wipe_annotations
//! POST   /backup        backup_now
//! GET    /replication   replication_status
//! ```

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export", get(admin::export_all))
        .route("/annotations", delete(admin::wipe_annotations))
        .route("/backup", post(admin::backup_now))
        .route("/replication", get(admin::replication_status))
}
