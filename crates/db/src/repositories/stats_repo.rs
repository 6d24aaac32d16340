//! Stats aggregator: incremental per-append upserts and full rebuild.

use sqlx::sqlite::Sqlite;
use sqlx::{Executor, FromRow, SqlitePool};

use calcmark_core::stats::{AggregateStats, ImageStat, UserStat, UNKNOWN_IMAGE_SOURCE};
use calcmark_core::types::Timestamp;

/// Maintains the `users` and `images` counter collections.
pub struct StatsRepo;

impl StatsRepo {
    /// Idempotent increment-or-create for a user's counters.
    ///
    /// Called inside the append transaction; the increment is expressed in
    /// SQL so no read-modify-write races with a concurrent writer.
    pub async fn upsert_user<'e, E>(
        executor: E,
        user_id: &str,
        now: Timestamp,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO users (user_id, first_annotation_at, last_annotation_at, total_annotations)
             VALUES ($1, $2, $2, 1)
             ON CONFLICT (user_id) DO UPDATE SET
                last_annotation_at = excluded.last_annotation_at,
                total_annotations = users.total_annotations + 1",
        )
        .bind(user_id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Idempotent increment-or-create for an image's counters.
    ///
    /// Images never registered by the catalog are created with
    /// `source = "unknown"` and the image id as filename.
    pub async fn upsert_image<'e, E>(executor: E, image_id: &str) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO images (image_id, filename, source, annotation_count)
             VALUES ($1, $1, $2, 1)
             ON CONFLICT (image_id) DO UPDATE SET
                annotation_count = images.annotation_count + 1",
        )
        .bind(image_id)
        .bind(UNKNOWN_IMAGE_SOURCE)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Whole-store aggregate counts, computed from the annotation log.
    pub async fn aggregate(pool: &SqlitePool) -> Result<AggregateStats, sqlx::Error> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
                COUNT(*),
                COUNT(DISTINCT user_id),
                COUNT(DISTINCT image_id),
                COUNT(CASE WHEN source = 'test' THEN 1 END),
                COUNT(CASE WHEN source = 'annotate' THEN 1 END)
             FROM annotations",
        )
        .fetch_one(pool)
        .await?;

        Ok(AggregateStats {
            total_annotations: row.0,
            unique_users: row.1,
            annotated_images: row.2,
            test_annotations: row.3,
            direct_annotations: row.4,
        })
    }

    /// Per-user counters ordered by total annotations descending.
    pub async fn user_stats(pool: &SqlitePool) -> Result<Vec<UserStat>, sqlx::Error> {
        let rows = sqlx::query_as::<_, UserStatRow>(
            "SELECT user_id, first_annotation_at, last_annotation_at, total_annotations
             FROM users
             ORDER BY total_annotations DESC, user_id ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(UserStatRow::into_stat).collect())
    }

    /// Per-image counters ordered by annotation count descending.
    pub async fn image_stats(pool: &SqlitePool) -> Result<Vec<ImageStat>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ImageStatRow>(
            "SELECT image_id, filename, source, annotation_count
             FROM images
             ORDER BY annotation_count DESC, image_id ASC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(ImageStatRow::into_stat).collect())
    }

    /// Recompute both stat collections by scanning the annotation log.
    ///
    /// The declared repair mechanism for drift after a crash mid-write,
    /// manual data edit, or partial restore. Registered filename/source on
    /// existing image rows are preserved; counters are overwritten.
    pub async fn rebuild(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM users
             WHERE user_id NOT IN (SELECT DISTINCT user_id FROM annotations)",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO users (user_id, first_annotation_at, last_annotation_at, total_annotations)
             SELECT user_id, MIN(created_at), MAX(created_at), COUNT(*)
             FROM annotations
             GROUP BY user_id
             ON CONFLICT (user_id) DO UPDATE SET
                first_annotation_at = excluded.first_annotation_at,
                last_annotation_at = excluded.last_annotation_at,
                total_annotations = excluded.total_annotations",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM images
             WHERE image_id NOT IN (SELECT DISTINCT image_id FROM annotations)",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO images (image_id, filename, source, annotation_count)
             SELECT image_id, image_id, $1, COUNT(*)
             FROM annotations
             GROUP BY image_id
             ON CONFLICT (image_id) DO UPDATE SET
                annotation_count = excluded.annotation_count",
        )
        .bind(UNKNOWN_IMAGE_SOURCE)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}

#[derive(Debug, FromRow)]
struct UserStatRow {
    user_id: String,
    first_annotation_at: Timestamp,
    last_annotation_at: Timestamp,
    total_annotations: i64,
}

impl UserStatRow {
    fn into_stat(self) -> UserStat {
        UserStat {
            user_id: self.user_id,
            first_annotation_at: self.first_annotation_at,
            last_annotation_at: self.last_annotation_at,
            total_annotations: self.total_annotations,
        }
    }
}

#[derive(Debug, FromRow)]
struct ImageStatRow {
    image_id: String,
    filename: String,
    source: String,
    annotation_count: i64,
}

impl ImageStatRow {
    fn into_stat(self) -> ImageStat {
        ImageStat {
            image_id: self.image_id,
            filename: self.filename,
            source: self.source,
            annotation_count: self.annotation_count,
        }
    }
}
