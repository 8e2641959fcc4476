use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

/// Columns shared by every kind of gallery entry.
///
/// Images and videos embed this struct (`#[sqlx(flatten)]` /
/// `#[serde(flatten)]`) instead of subclassing a common schema.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct EntryCore {
    pub id: Uuid,
    pub author_cid: String,
    /// Display name of the uploader, denormalized at time of write.
    pub author: Option<String>,
    /// None until the entry is assigned to a gallery.
    pub gallery_id: Option<Uuid>,
    pub is_gallery_thumbnail: bool,
    /// Ordered, lowercase, duplicates kept. A denormalized copy of the
    /// image_tags records; every tag mutation writes both.
    #[ts(type = "Array<string>")]
    pub tags: Json<Vec<String>>,
    #[ts(type = "Date")]
    pub shot_at: DateTime<Utc>,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

/// Operations common to every entry kind, each implemented against the
/// kind's own table. The generic entry router is written against this trait.
#[async_trait]
pub trait GalleryEntry: Sized + Send + Sync + Unpin + 'static {
    fn core(&self) -> &EntryCore;

    async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error>;

    /// All entries of a gallery, ordered by capture time ascending.
    async fn find_by_gallery(pool: &SqlitePool, gallery_id: Uuid)
    -> Result<Vec<Self>, sqlx::Error>;

    async fn find_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error>;

    /// Entries of a gallery currently flagged as its thumbnail. At most one
    /// should exist, but the flag is reconciled without a transaction so
    /// callers must tolerate several.
    async fn find_gallery_thumbnails(
        pool: &SqlitePool,
        gallery_id: Option<Uuid>,
    ) -> Result<Vec<Self>, sqlx::Error>;

    async fn set_gallery_thumbnail(
        pool: &SqlitePool,
        id: Uuid,
        flagged: bool,
    ) -> Result<(), sqlx::Error>;

    async fn update_author(
        pool: &SqlitePool,
        id: Uuid,
        author_cid: &str,
        author: Option<&str>,
    ) -> Result<(), sqlx::Error>;

    async fn update_tags(pool: &SqlitePool, id: Uuid, tags: &[String])
    -> Result<(), sqlx::Error>;

    async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error>;
}

/// Build an `IN (?, ?, ...)` placeholder list for a dynamic id set.
pub(crate) fn id_placeholders(count: usize) -> String {
    let mut s = String::new();
    for i in 0..count {
        if i > 0 {
            s.push_str(", ");
        }
        s.push('?');
    }
    s
}
