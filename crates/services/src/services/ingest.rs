//! Per-file ingestion orchestration.
//!
//! Each staged upload runs as its own async chain: place the full-size
//! file, derive renditions, extract capture metadata, persist the record.
//! Chains are independent; one file failing never aborts its siblings, and
//! the HTTP response does not wait for them.

use std::path::PathBuf;

use chrono::Utc;
use db::models::image::{CreateImage, Image};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::exif;
use super::renditions::RenditionGenerator;
use super::storage::{ImageStorage, assign_filename};

/// A file received by the upload route, parked in temporary storage.
#[derive(Debug)]
pub struct StagedUpload {
    pub temp_path: PathBuf,
    pub original_name: String,
}

/// Identity of the uploading session, passed explicitly per request.
#[derive(Debug, Clone)]
pub struct Uploader {
    pub cid: String,
    pub fullname: Option<String>,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("rendition worker panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct IngestService {
    pool: SqlitePool,
    storage: ImageStorage,
    renditions: RenditionGenerator,
}

impl IngestService {
    pub fn new(pool: SqlitePool, storage: ImageStorage) -> Self {
        Self {
            pool,
            storage,
            renditions: RenditionGenerator::default(),
        }
    }

    pub fn storage(&self) -> &ImageStorage {
        &self.storage
    }

    /// Launch one independent ingestion task per staged file.
    ///
    /// The returned handles are only ever joined for logging and tests;
    /// callers respond to the client without waiting on them.
    pub fn spawn_batch(
        &self,
        files: Vec<StagedUpload>,
        gallery_id: Option<Uuid>,
        uploader: &Uploader,
    ) -> Vec<JoinHandle<()>> {
        let count = files.len();
        let handles = files
            .into_iter()
            .map(|file| {
                let service = self.clone();
                let gallery_id = gallery_id;
                let uploader = uploader.clone();
                tokio::spawn(async move {
                    if let Err(err) = service.ingest_file(file, gallery_id, &uploader).await {
                        error!(error = %err, "Image ingestion failed");
                    }
                })
            })
            .collect();
        info!("{} new images uploaded by {}", count, uploader.cid);
        handles
    }

    /// The full pipeline for one file: place, derive, extract, persist.
    pub async fn ingest_file(
        &self,
        file: StagedUpload,
        gallery_id: Option<Uuid>,
        uploader: &Uploader,
    ) -> Result<Image, IngestError> {
        let (token, file_name) = assign_filename(&file.original_name);

        let full_size = self
            .storage
            .place_full_size(&file.temp_path, gallery_id, &file_name)
            .await?;

        let metadata = exif::read_capture_metadata(&full_size).await;
        let orientation = metadata.orientation;

        let thumbnail = self.storage.thumbnail_path(gallery_id, &file_name);
        let preview = self.storage.preview_path(gallery_id, &file_name);

        // Derivative failures are logged but never block persisting the
        // full-size asset.
        let generator = self.renditions;
        let src = full_size.clone();
        let dst = thumbnail.clone();
        let result = tokio::task::spawn_blocking(move || {
            generator.generate_thumbnail(&src, &dst, orientation)
        })
        .await?;
        match result {
            Ok(()) => info!("Saved thumbnail {}", thumbnail.display()),
            Err(err) => error!(error = %err, "Could not save thumbnail for image {token}"),
        }

        let src = full_size.clone();
        let dst = preview.clone();
        let result = tokio::task::spawn_blocking(move || {
            generator.generate_preview(&src, &dst, orientation)
        })
        .await?;
        match result {
            Ok(()) => info!("Saved preview {}", preview.display()),
            Err(err) => error!(error = %err, "Could not save preview for image {token}"),
        }

        let shot_at = metadata.shot_at.unwrap_or_else(Utc::now);

        let data = CreateImage {
            filename: token.clone(),
            author_cid: uploader.cid.clone(),
            author: uploader.fullname.clone(),
            gallery_id,
            shot_at,
            thumbnail_path: thumbnail.to_string_lossy().into_owned(),
            preview_path: preview.to_string_lossy().into_owned(),
            full_size_path: full_size.to_string_lossy().into_owned(),
            exif_data: metadata.raw,
        };

        let image = Image::create(&self.pool, &data, Uuid::new_v4()).await?;
        info!("Saved image {token}");
        Ok(image)
    }
}
