//! Row representation of an annotation and list/export DTOs.

use serde::Serialize;
use sqlx::FromRow;

use calcmark_core::annotation::{Annotation, Source};
use calcmark_core::error::CoreError;
use calcmark_core::types::Timestamp;

/// A row from the `annotations` table.
///
/// The mask reference is kept as its JSON text form in the `mask` column so
/// the annotation log can be read without touching the other collections.
#[derive(Debug, Clone, FromRow)]
pub struct AnnotationRow {
    pub id: uuid::Uuid,
    pub image_id: String,
    pub user_id: String,
    pub source: String,
    pub original_image: String,
    pub mask: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AnnotationRow {
    /// Convert a row back into the canonical record.
    pub fn into_annotation(self) -> Result<Annotation, CoreError> {
        let mask = serde_json::from_str(&self.mask)
            .map_err(|e| CoreError::Internal(format!("Corrupt mask column: {e}")))?;
        Ok(Annotation {
            id: self.id,
            image_id: self.image_id,
            user_id: self.user_id,
            source: Source::parse(&self.source)?,
            original_image: self.original_image,
            mask,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Optional filters for listing annotations.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub user_id: Option<String>,
    pub image_id: Option<String>,
}

/// An annotation joined with the current stat snapshots for export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    #[serde(flatten)]
    pub annotation: Annotation,
    pub user_total_annotations: i64,
    pub image_total_annotations: i64,
}
