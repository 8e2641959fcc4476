use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

use super::gallery_entry::{EntryCore, GalleryEntry, id_placeholders};

/// An externally hosted video belonging to a gallery.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Video {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub core: EntryCore,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateVideo {
    pub url: String,
    pub author_cid: String,
    pub author: Option<String>,
    pub gallery_id: Option<Uuid>,
    #[ts(type = "Date")]
    pub shot_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "id, author_cid, author, gallery_id, is_gallery_thumbnail, tags, shot_at, created_at, url";

impl Video {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateVideo,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO videos (id, author_cid, author, gallery_id, is_gallery_thumbnail, \
             tags, shot_at, created_at, url) \
             VALUES (?, ?, ?, ?, 0, '[]', ?, ?, ?) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.author_cid)
        .bind(&data.author)
        .bind(data.gallery_id)
        .bind(data.shot_at)
        .bind(Utc::now())
        .bind(&data.url)
        .fetch_one(pool)
        .await
    }
}

#[async_trait]
impl GalleryEntry for Video {
    fn core(&self) -> &EntryCore {
        &self.core
    }

    async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {SELECT_COLUMNS} FROM videos WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    async fn find_by_gallery(
        pool: &SqlitePool,
        gallery_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {SELECT_COLUMNS} FROM videos WHERE gallery_id = ? ORDER BY shot_at ASC"
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
            "SELECT {SELECT_COLUMNS} FROM videos WHERE id IN ({}) ORDER BY shot_at ASC",
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
            "SELECT {SELECT_COLUMNS} FROM videos \
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
        sqlx::query("UPDATE videos SET is_gallery_thumbnail = ? WHERE id = ?")
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
        sqlx::query("UPDATE videos SET author_cid = ?, author = ? WHERE id = ?")
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
        sqlx::query("UPDATE videos SET tags = ? WHERE id = ?")
            .bind(Json(tags))
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
