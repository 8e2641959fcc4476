use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Denormalized tag record, written in addition to the entry's own `tags`
/// array so tag search never has to scan every entry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ImageTag {
    pub id: Uuid,
    pub image_id: Uuid,
    pub tag_name: String,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

impl ImageTag {
    pub async fn create(
        pool: &SqlitePool,
        image_id: Uuid,
        tag_name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO image_tags (id, image_id, tag_name, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, image_id, tag_name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(image_id)
        .bind(tag_name)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_image(
        pool: &SqlitePool,
        image_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, image_id, tag_name, created_at FROM image_tags WHERE image_id = ?",
        )
        .bind(image_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_tag(pool: &SqlitePool, tag_name: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, image_id, tag_name, created_at FROM image_tags WHERE tag_name = ?",
        )
        .bind(tag_name)
        .fetch_all(pool)
        .await
    }
}
