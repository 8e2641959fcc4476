use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

/// Named permission bits checked before mutating operations.
///
/// A route is gated on a mask of these; the check passes when the user holds
/// any bit of the mask.
pub struct Restrictions;

impl Restrictions {
    pub const READ: i64 = 1;
    pub const WRITE_IMAGES: i64 = 1 << 1;
    pub const WRITE_GALLERY: i64 = 1 << 2;
    pub const ADMIN: i64 = 1 << 3;
}

/// Identity record maintained by the external auth collaborator.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub cid: String,
    pub fullname: String,
    pub restrictions: i64,
    #[ts(type = "Date")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn has_any_restriction(&self, mask: i64) -> bool {
        self.restrictions & mask != 0
    }

    pub async fn find_by_cid(pool: &SqlitePool, cid: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT cid, fullname, restrictions, created_at FROM users WHERE cid = ?",
        )
        .bind(cid)
        .fetch_optional(pool)
        .await
    }

    /// Resolve the user behind a session token issued by the auth layer.
    pub async fn find_by_session_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT u.cid, u.fullname, u.restrictions, u.created_at \
             FROM users u JOIN sessions s ON s.cid = u.cid \
             WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Test/seed helper used by the admin tooling: upsert a user record.
    pub async fn upsert(
        pool: &SqlitePool,
        cid: &str,
        fullname: &str,
        restrictions: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (cid, fullname, restrictions, created_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (cid) DO UPDATE SET fullname = excluded.fullname, \
             restrictions = excluded.restrictions \
             RETURNING cid, fullname, restrictions, created_at",
        )
        .bind(cid)
        .bind(fullname)
        .bind(restrictions)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn create_session(
        pool: &SqlitePool,
        cid: &str,
        token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO sessions (token, cid, created_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(cid)
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(())
    }
}
