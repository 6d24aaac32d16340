//! Route registration.

pub mod admin;
pub mod annotations;
pub mod health;
pub mod stats;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(annotations::router())
        .merge(stats::router())
        .nest("/admin", admin::router())
}
