use std::path::{Path, PathBuf};

use db::DBService;
use services::services::{ingest::IngestService, storage::ImageStorage};

pub mod error;
pub mod file_logging;
pub mod middleware;
pub mod routes;

/// Shared application state handed to every route.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    ingest: IngestService,
    staging_dir: PathBuf,
}

impl AppState {
    /// Wire up the database and the ingestion pipeline from the environment.
    pub async fn new() -> anyhow::Result<Self> {
        let db = DBService::new().await?;
        let storage = ImageStorage::from_env();
        let staging_dir = utils::assets::temp_upload_dir();
        Ok(Self::with_parts(db, storage, staging_dir))
    }

    /// State over an existing pool, storage root and staging area, used by
    /// tests.
    pub fn with_parts(db: DBService, storage: ImageStorage, staging_dir: PathBuf) -> Self {
        let ingest = IngestService::new(db.pool.clone(), storage);
        Self {
            db,
            ingest,
            staging_dir,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn ingest(&self) -> &IngestService {
        &self.ingest
    }

    pub fn storage(&self) -> &ImageStorage {
        self.ingest.storage()
    }

    /// Directory multipart uploads are parked in before ingestion.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }
}
