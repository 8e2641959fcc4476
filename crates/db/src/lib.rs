use std::{str::FromStr, time::Duration};

use sqlx::{
    Error, Pool, Sqlite,
    sqlite::{
        SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions,
        SqliteSynchronous,
    },
};
use sqlx::Executor;
use tracing::info;
use utils::assets::database_path;

pub mod models;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Default maximum connections in the pool.
/// SQLite benefits from limited connections due to single-writer model.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection acquisition timeout in seconds.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Apply performance pragmas to a new SQLite connection.
///
/// `synchronous` must be set after `mmap_size`; enabling mmap can otherwise
/// leave fsync behavior undefined under heavy write load.
async fn apply_performance_pragmas(conn: &mut SqliteConnection) -> Result<(), Error> {
    conn.execute("PRAGMA temp_store = 2").await?;
    conn.execute("PRAGMA mmap_size = 67108864").await?; // 64MB
    conn.execute("PRAGMA synchronous = NORMAL").await?;
    conn.execute("PRAGMA cache_size = -64000").await?; // 64MB, negative = KB
    Ok(())
}

#[derive(Clone)]
pub struct DBService {
    pub pool: Pool<Sqlite>,
}

impl DBService {
    /// Open (creating if missing) the application database, apply pragmas
    /// and run any pending migrations.
    pub async fn new() -> Result<DBService, Error> {
        let db_path = database_path();
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        info!(path = %db_path.display(), "Initializing SQLite connection pool");

        let options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
            .after_connect(|conn, _meta| {
                Box::pin(async move { apply_performance_pragmas(conn).await })
            })
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(DBService { pool })
    }
}
