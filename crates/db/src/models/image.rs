use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::gallery_entry::{EntryCore, GalleryEntry, id_placeholders};

/// An uploaded photograph with its three on-disk renditions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Image {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub core: EntryCore,
    /// Random token assigned at ingestion, extension not included.
    pub filename: String,
    pub thumbnail_path: String,
    pub preview_path: String,
    pub full_size_path: String,
    /// Opaque parsed EXIF blob, stored for display only.
    #[ts(type = "any | null")]
    pub exif_data: Option<Json<serde_json::Value>>,
}

/// Data for a new image record, assembled by the ingestion pipeline.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateImage {
    pub filename: String,
    pub author_cid: String,
    pub author: Option<String>,
    pub gallery_id: Option<Uuid>,
    #[ts(type = "Date")]
    pub shot_at: DateTime<Utc>,
    pub thumbnail_path: String,
    pub preview_path: String,
    pub full_size_path: String,
    #[ts(type = "any | null")]
    pub exif_data: Option<serde_json::Value>,
}

const SELECT_COLUMNS: &str = "id, author_cid, author, gallery_id, is_gallery_thumbnail, \
     tags, shot_at, created_at, filename, thumbnail_path, preview_path, full_size_path, exif_data";

impl Image {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateImage,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO images (id, author_cid, author, gallery_id, is_gallery_thumbnail, \
             tags, shot_at, created_at, filename, thumbnail_path, preview_path, \
             full_size_path, exif_data) \
             VALUES (?, ?, ?, ?, 0, '[]', ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.author_cid)
        .bind(&data.author)
        .bind(data.gallery_id)
        .bind(data.shot_at)
        .bind(Utc::now())
        .bind(&data.filename)
        .bind(&data.thumbnail_path)
        .bind(&data.preview_path)
        .bind(&data.full_size_path)
        .bind(data.exif_data.as_ref().map(Json))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_filename(
        pool: &SqlitePool,
        filename: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLUMNS} FROM images WHERE filename = ?"
        ))
        .bind(filename)
        .fetch_optional(pool)
        .await
    }
}

#[async_trait]
impl GalleryEntry for Image {
    fn core(&self) -> &EntryCore {
        &self.core
    }

    async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {SELECT_COLUMNS} FROM images WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    async fn find_by_gallery(
        pool: &SqlitePool,
        gallery_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLUMNS} FROM images WHERE gallery_id = ? ORDER BY shot_at ASC"
        ))
        .bind(gallery_id)
        .fetch_all(pool)
        .await
    }

    async fn find_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM images WHERE id IN ({}) ORDER BY shot_at ASC",
            id_placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, Self>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        query.fetch_all(pool).await
    }

    async fn find_gallery_thumbnails(
        pool: &SqlitePool,
        gallery_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLUMNS} FROM images \
             WHERE gallery_id IS ? AND is_gallery_thumbnail = 1"
        ))
        .bind(gallery_id)
        .fetch_all(pool)
        .await
    }

    async fn set_gallery_thumbnail(
        pool: &SqlitePool,
        id: Uuid,
        flagged: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE images SET is_gallery_thumbnail = ? WHERE id = ?")
            .bind(flagged)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn update_author(
        pool: &SqlitePool,
        id: Uuid,
        author_cid: &str,
        author: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE images SET author_cid = ?, author = ? WHERE id = ?")
            .bind(author_cid)
            .bind(author)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn update_tags(
        pool: &SqlitePool,
        id: Uuid,
        tags: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE images SET tags = ? WHERE id = ?")
            .bind(Json(tags))
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
