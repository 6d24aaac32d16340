//! The local durable store handle.
//!
//! Wraps the pool and composes repository calls into the operations the rest
//! of the system uses. Every append is a single transaction covering the log
//! insert and both stat upserts — SQLite serializes writing transactions, so
//! that transaction is the store-scoped mutual exclusion for concurrent
//! savers, and the administrative wipe shares the same scope.

use sqlx::SqlitePool;

use calcmark_core::annotation::Annotation;
use calcmark_core::stats::{AggregateStats, ImageStat, UserStat};
use calcmark_core::types::AnnotationId;

use crate::models::{ExportRecord, ListFilter};
use crate::repositories::{AnnotationRepo, StatsRepo};

/// Default read limit when the caller does not specify one.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Handle to the local annotation database.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Durably append one annotation and update both stat aggregates.
    ///
    /// The record is visible to any `list` call issued after this returns.
    /// Fails only on a local write error, which the caller must surface.
    pub async fn append(&self, annotation: &Annotation) -> Result<AnnotationId, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        AnnotationRepo::insert(&mut *tx, annotation).await?;
        StatsRepo::upsert_user(&mut *tx, &annotation.user_id, annotation.created_at).await?;
        StatsRepo::upsert_image(&mut *tx, &annotation.image_id).await?;
        tx.commit().await?;
        Ok(annotation.id)
    }

    /// Materialize restored records, preserving their ids and timestamps,
    /// then rebuild the stat aggregates from the restored log.
    pub async fn restore(&self, annotations: &[Annotation]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for annotation in annotations {
            AnnotationRepo::insert(&mut *tx, annotation).await?;
        }
        tx.commit().await?;
        StatsRepo::rebuild(&self.pool).await
    }

    /// Ordered read of the annotation log (newest first, insertion-order
    /// tie-break), optionally filtered by user and/or image.
    pub async fn list(
        &self,
        filter: &ListFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        AnnotationRepo::list(&self.pool, filter, limit.unwrap_or(DEFAULT_LIST_LIMIT)).await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        AnnotationRepo::count(&self.pool).await
    }

    pub async fn aggregate(&self) -> Result<AggregateStats, sqlx::Error> {
        StatsRepo::aggregate(&self.pool).await
    }

    pub async fn user_stats(&self) -> Result<Vec<UserStat>, sqlx::Error> {
        StatsRepo::user_stats(&self.pool).await
    }

    pub async fn image_stats(&self) -> Result<Vec<ImageStat>, sqlx::Error> {
        StatsRepo::image_stats(&self.pool).await
    }

    pub async fn export_all(&self) -> Result<Vec<ExportRecord>, sqlx::Error> {
        AnnotationRepo::export_all(&self.pool).await
    }

    /// Recompute stat aggregates by full scan (drift repair).
    pub async fn rebuild_stats(&self) -> Result<(), sqlx::Error> {
        StatsRepo::rebuild(&self.pool).await
    }

    /// True when the store holds no annotations and no stat rows.
    ///
    /// Recovery keys its restore decision off this: stats are checked too so
    /// a store with stale stat rows but a truncated log is not treated as
    /// cold.
    pub async fn is_empty(&self) -> Result<bool, sqlx::Error> {
        let (annotations,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM annotations")
            .fetch_one(&self.pool)
            .await?;
        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let (images,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;
        Ok(annotations == 0 && users == 0 && images == 0)
    }

    /// Clear all three collections in one transaction.
    ///
    /// Shares the writer-exclusion scope with `append`, so a wipe never
    /// lands in the middle of a save.
    pub async fn wipe(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM annotations").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM images").execute(&mut *tx).await?;
        tx.commit().await
    }
}
