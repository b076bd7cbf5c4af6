//! Video record repository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use vidova_models::{Sensitivity, VideoId, VideoRecord, VideoStatus, VideoWithUploader};

use crate::error::DbResult;
use crate::models::{VideoRow, VideoWithUploaderRow};

/// Data access for video records.
///
/// `complete` and `mark_error` are the only mutations after creation.
/// Both are conditional on the record still being `Processing`, which
/// makes the terminal write at-most-once and forward-only without any
/// locking beyond SQLite's single-statement atomicity.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Persist a freshly created record.
    async fn create(&self, record: &VideoRecord) -> DbResult<()>;

    /// Fetch a record by ID.
    async fn find_by_id(&self, id: &VideoId) -> DbResult<Option<VideoRecord>>;

    /// Fetch a record with its uploader's username resolved.
    async fn find_with_uploader(&self, id: &VideoId) -> DbResult<Option<VideoWithUploader>>;

    /// All records owned by `uploader_id`, newest first.
    async fn list_by_uploader(&self, uploader_id: &str) -> DbResult<Vec<VideoRecord>>;

    /// Transition `Processing -> Completed` with the given sensitivity.
    /// Returns the updated record, or `None` if the record was missing
    /// or already terminal.
    async fn complete(&self, id: &VideoId, sensitivity: Sensitivity)
        -> DbResult<Option<VideoRecord>>;

    /// Transition `Processing -> Error`, sensitivity untouched. Same
    /// return contract as [`complete`](Self::complete).
    async fn mark_error(&self, id: &VideoId) -> DbResult<Option<VideoRecord>>;

    /// Delete every record. Maintenance operation backing the library
    /// reset; returns the number of rows removed.
    async fn delete_all(&self) -> DbResult<u64>;
}

/// SQLx implementation of [`VideoRepository`].
pub struct SqlxVideoRepository {
    pool: SqlitePool,
}

impl SqlxVideoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Conditional terminal update; `None` when the row was not in
    /// `Processing` anymore (or never existed).
    async fn finish(
        &self,
        id: &VideoId,
        status: VideoStatus,
        sensitivity: Option<Sensitivity>,
    ) -> DbResult<Option<VideoRecord>> {
        let sensitivity = sensitivity.unwrap_or(Sensitivity::Unchecked).as_str();
        let result = sqlx::query(
            r#"
            UPDATE videos SET status = ?, sensitivity = ?
            WHERE id = ? AND status = 'processing'
            "#,
        )
        .bind(status.as_str())
        .bind(sensitivity)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!("Video {id} finished as {status}");
        self.find_by_id(id).await
    }
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(&self, record: &VideoRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, title, filename, filepath, size, uploader_id,
                status, sensitivity, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(&record.title)
        .bind(&record.filename)
        .bind(&record.filepath)
        .bind(record.size)
        .bind(&record.uploader_id)
        .bind(record.status.as_str())
        .bind(record.sensitivity.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        info!("Created video record {}", record.id);
        Ok(())
    }

    async fn find_by_id(&self, id: &VideoId) -> DbResult<Option<VideoRecord>> {
        let row = sqlx::query_as::<_, VideoRow>("SELECT * FROM videos WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(VideoRow::into_record).transpose()
    }

    async fn find_with_uploader(&self, id: &VideoId) -> DbResult<Option<VideoWithUploader>> {
        let row = sqlx::query_as::<_, VideoWithUploaderRow>(
            r#"
            SELECT v.*, u.username AS uploader_username
            FROM videos v JOIN users u ON u.id = v.uploader_id
            WHERE v.id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(VideoWithUploaderRow::into_record).transpose()
    }

    async fn list_by_uploader(&self, uploader_id: &str) -> DbResult<Vec<VideoRecord>> {
        let rows = sqlx::query_as::<_, VideoRow>(
            "SELECT * FROM videos WHERE uploader_id = ? ORDER BY created_at DESC",
        )
        .bind(uploader_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(VideoRow::into_record).collect()
    }

    async fn complete(
        &self,
        id: &VideoId,
        sensitivity: Sensitivity,
    ) -> DbResult<Option<VideoRecord>> {
        self.finish(id, VideoStatus::Completed, Some(sensitivity)).await
    }

    async fn mark_error(&self, id: &VideoId) -> DbResult<Option<VideoRecord>> {
        self.finish(id, VideoStatus::Error, None).await
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM videos").execute(&self.pool).await?;
        info!("Deleted {} video records", result.rows_affected());
        Ok(result.rows_affected())
    }
}
