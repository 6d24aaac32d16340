//! Annotation submission and listing.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use calcmark_core::annotation::{Annotation, NewAnnotation, Source};
use calcmark_core::mask::{decode_mask_data_url, mask_stats_from_png, MaskReference, MaskStats};
use calcmark_core::types::{new_annotation_id, normalize_user_id};
use calcmark_db::models::ListFilter;
use calcmark_sync::StorageTier;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/annotations/{image_id}`.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Base64 PNG mask, with or without a `data:image/png;base64,` prefix.
    pub mask_data: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub original_image: String,
}

/// Response body for a successful save.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub id: calcmark_core::types::AnnotationId,
    /// Highest tier that will hold this record (`local` when no remote is
    /// configured). Remote pushes happen in the background; this reflects
    /// configuration, not delivery.
    pub storage_tier: StorageTier,
    pub mask_stats: MaskStats,
}

/// POST /api/annotations/{image_id} -- record a new annotation.
///
/// The local commit is synchronous; remote replication is fire-and-forget.
pub async fn save_annotation(
    State(state): State<AppState>,
    Path(image_id): Path<String>,
    Json(body): Json<SaveRequest>,
) -> AppResult<Json<DataResponse<SaveResponse>>> {
    let submission = NewAnnotation {
        image_id,
        user_id: body.user_id,
        mask_data: body.mask_data,
        original_image: body.original_image,
    };
    submission.validate()?;

    let png_bytes = decode_mask_data_url(&submission.mask_data)?;
    let mask_stats = mask_stats_from_png(&png_bytes)?;

    // Raw pixels live on local disk; only the summary travels to remotes.
    let filename = format!(
        "{}-{}.png",
        submission.image_id,
        Utc::now().timestamp_millis()
    );
    let path = state.config.uploads_dir().join(&filename);
    tokio::fs::write(&path, &png_bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store mask file: {e}")))?;

    let now = Utc::now();
    let annotation = Annotation {
        id: new_annotation_id(),
        source: Source::for_image_id(&submission.image_id),
        image_id: submission.image_id,
        user_id: normalize_user_id(submission.user_id.as_deref()),
        original_image: submission.original_image,
        mask: MaskReference::File { filename },
        created_at: now,
        updated_at: now,
    };

    let receipt = state.replicator.save(annotation, mask_stats.clone()).await?;
    tracing::info!(
        annotation_id = %receipt.id,
        storage_tier = receipt.storage_tier.as_str(),
        coverage_percent = mask_stats.coverage_percent,
        "Annotation saved"
    );

    Ok(Json(DataResponse {
        data: SaveResponse {
            id: receipt.id,
            storage_tier: receipt.storage_tier,
            mask_stats,
        },
    }))
}

/// Query parameters for `GET /api/annotations`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub image_id: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/annotations -- list recorded annotations, newest first.
pub async fn list_annotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<Annotation>>>> {
    let filter = ListFilter {
        user_id: query.user_id,
        image_id: query.image_id,
    };
    let annotations = state.store().list(&filter, query.limit).await?;
    Ok(Json(DataResponse { data: annotations }))
}
