//! Repository for the `annotations` table.

use sqlx::sqlite::Sqlite;
use sqlx::{Executor, FromRow, SqlitePool};

use calcmark_core::annotation::Annotation;
use calcmark_core::error::CoreError;
use calcmark_core::types::Timestamp;

use crate::models::{AnnotationRow, ExportRecord, ListFilter};

/// Column list for annotation queries.
const COLUMNS: &str =
    "id, image_id, user_id, source, original_image, mask, created_at, updated_at";

/// Read order: newest first, ties broken by insertion order.
const ORDERING: &str = "ORDER BY created_at DESC, rowid DESC";

/// Provides append and read access to the annotation log.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Append a record. Runs on any executor so the caller can wrap it in a
    /// transaction together with the stat upserts.
    pub async fn insert<'e, E>(executor: E, annotation: &Annotation) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mask_json = serde_json::to_string(&annotation.mask)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            "INSERT INTO annotations
                (id, image_id, user_id, source, original_image, mask, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(annotation.id)
        .bind(&annotation.image_id)
        .bind(&annotation.user_id)
        .bind(annotation.source.as_str())
        .bind(&annotation.original_image)
        .bind(mask_json)
        .bind(annotation.created_at)
        .bind(annotation.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// List annotations, optionally filtered by user and/or image, newest
    /// first with insertion-order tie-break.
    pub async fn list(
        pool: &SqlitePool,
        filter: &ListFilter,
        limit: i64,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE ($1 IS NULL OR user_id = $1)
               AND ($2 IS NULL OR image_id = $2)
             {ORDERING}
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, AnnotationRow>(&query)
            .bind(&filter.user_id)
            .bind(&filter.image_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        rows.into_iter()
            .map(|row| row.into_annotation().map_err(into_decode_error))
            .collect()
    }

    /// Total number of records in the log.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM annotations")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Every annotation joined with the current stat snapshots, newest first.
    pub async fn export_all(pool: &SqlitePool) -> Result<Vec<ExportRecord>, sqlx::Error> {
        let query = format!(
            "SELECT a.id, a.image_id, a.user_id, a.source, a.original_image, a.mask,
                    a.created_at, a.updated_at,
                    COALESCE(u.total_annotations, 0) AS user_total_annotations,
                    COALESCE(i.annotation_count, 0) AS image_total_annotations
             FROM annotations a
             LEFT JOIN users u ON a.user_id = u.user_id
             LEFT JOIN images i ON a.image_id = i.image_id
             ORDER BY a.created_at DESC, a.rowid DESC"
        );
        let rows = sqlx::query_as::<_, ExportRow>(&query).fetch_all(pool).await?;

        rows.into_iter()
            .map(|row| {
                let annotation = AnnotationRow {
                    id: row.id,
                    image_id: row.image_id,
                    user_id: row.user_id,
                    source: row.source,
                    original_image: row.original_image,
                    mask: row.mask,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
                .into_annotation()
                .map_err(into_decode_error)?;

                Ok(ExportRecord {
                    annotation,
                    user_total_annotations: row.user_total_annotations,
                    image_total_annotations: row.image_total_annotations,
                })
            })
            .collect()
    }
}

/// Joined row for [`AnnotationRepo::export_all`].
#[derive(Debug, FromRow)]
struct ExportRow {
    id: uuid::Uuid,
    image_id: String,
    user_id: String,
    source: String,
    original_image: String,
    mask: String,
    created_at: Timestamp,
    updated_at: Timestamp,
    user_total_annotations: i64,
    image_total_annotations: i64,
}

fn into_decode_error(e: CoreError) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(e))
}
