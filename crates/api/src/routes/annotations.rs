//! Annotation routes.
//!
//! ```text
//! POST /annotations/{image_id}   save_annotation
//! GET  /annotations              list_annotations (?user_id, ?image_id, ?limit)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotations;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/annotations", get(annotations::list_annotations))
        .route("/annotations/{image_id}", post(annotations::save_annotation))
}
