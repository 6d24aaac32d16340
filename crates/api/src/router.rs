//! Router assembly, shared by the binary and the integration tests.

use axum::Router;

use crate::routes;
use crate::state::AppState;

/// Build the application router with state applied. Middleware layers are
/// the binary's concern.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_routes())
        .with_state(state)
}
