use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A named collection of entries with a publication flag.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Gallery {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub published: bool,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateGallery {
    pub name: String,
    pub description: Option<String>,
}

impl Gallery {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateGallery,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO galleries (id, name, description, published, created_at) \
             VALUES (?, ?, ?, 0, ?) \
             RETURNING id, name, description, published, created_at",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, description, published, created_at FROM galleries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
