//! Image routes: multipart upload, rendition streaming, and the common
//! entry operations mounted for the image kind.

use std::path::Path as StdPath;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{Response, StatusCode, header},
    routing::{get, post},
};
use db::models::{
    gallery::Gallery,
    gallery_entry::GalleryEntry,
    image::Image,
    user::Restrictions,
};
use services::services::ingest::{StagedUpload, Uploader};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use uuid::Uuid;

use super::gallery_entries::{self, delete_entry, list_entries};
use crate::{AppState, error::ApiError, middleware::AuthSession};

/// Multipart field name every file part must use.
const UPLOAD_FIELD_NAME: &str = "photos";

/// Upload size cap for a whole multipart batch.
const MAX_UPLOAD_BYTES: usize = 250 * 1024 * 1024;

/// Drain the multipart stream into the staging area, validating field names
/// as we go. Any failure mid-batch removes everything already staged, so a
/// rejected upload leaves no files behind.
async fn stage_multipart(
    staging_dir: &StdPath,
    multipart: Multipart,
) -> Result<Vec<StagedUpload>, ApiError> {
    let mut staged: Vec<StagedUpload> = Vec::new();
    match drain_fields(staging_dir, multipart, &mut staged).await {
        Ok(()) => Ok(staged),
        Err(err) => {
            for upload in &staged {
                if let Err(remove_err) = tokio::fs::remove_file(&upload.temp_path).await {
                    debug!(error = %remove_err, "Failed to remove staged upload");
                }
            }
            Err(err)
        }
    }
}

async fn drain_fields(
    staging_dir: &StdPath,
    mut multipart: Multipart,
    staged: &mut Vec<StagedUpload>,
) -> Result<(), ApiError> {
    tokio::fs::create_dir_all(staging_dir).await?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            return Err(ApiError::BadRequest(
                "incorrect fieldName specified".to_string(),
            ));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let temp_path = staging_dir.join(Uuid::new_v4().to_string());

        let mut file = tokio::fs::File::create(&temp_path).await?;
        // Recorded before streaming so a partially written file is still
        // removed when a later chunk fails.
        staged.push(StagedUpload {
            temp_path: temp_path.clone(),
            original_name,
        });
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
    }

    Ok(())
}

fn uploader_from(session: &AuthSession) -> Uploader {
    Uploader {
        cid: session.0.cid.clone(),
        fullname: Some(session.0.fullname.clone()),
    }
}

/// POST /v1/image - upload images not yet attached to any gallery.
///
/// Responds 202 once the batch is staged; ingestion continues in background
/// tasks, so renditions are not guaranteed to exist when the response lands.
pub async fn upload_images(
    State(state): State<AppState>,
    session: AuthSession,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    session.require_any(
        Restrictions::WRITE_IMAGES | Restrictions::WRITE_GALLERY,
        "upload images",
    )?;

    let staged = stage_multipart(state.staging_dir(), multipart).await?;
    state
        .ingest()
        .spawn_batch(staged, None, &uploader_from(&session));
    Ok(StatusCode::ACCEPTED)
}

/// POST /v1/image/{gallery_id} - upload images into a gallery.
pub async fn upload_images_to_gallery(
    State(state): State<AppState>,
    Path(gallery_id): Path<Uuid>,
    session: AuthSession,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    session.require_any(Restrictions::WRITE_IMAGES, "upload images")?;

    let pool = &state.db().pool;
    Gallery::find_by_id(pool, gallery_id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;

    info!("Preparing upload of files to gallery {gallery_id}");
    let staged = stage_multipart(state.staging_dir(), multipart).await?;
    state
        .ingest()
        .spawn_batch(staged, Some(gallery_id), &uploader_from(&session));
    Ok(StatusCode::ACCEPTED)
}

async fn stream_rendition(path: &str) -> Result<Response<Body>, ApiError> {
    let file = tokio::fs::File::open(path).await?;
    let content_type = mime_guess::from_path(path).first_or_octet_stream();
    let stream = ReaderStream::new(file);

    Ok(Response::builder()
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .body(Body::from_stream(stream))
        .expect("response builder with static parts"))
}

/// GET /v1/image/{id}/fullSize
pub async fn serve_full_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response<Body>, ApiError> {
    let image = Image::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
    stream_rendition(&image.full_size_path).await
}

/// GET /v1/image/{id}/thumbnail
pub async fn serve_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response<Body>, ApiError> {
    let image = Image::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
    stream_rendition(&image.thumbnail_path).await
}

/// GET /v1/image/{id}/preview
pub async fn serve_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response<Body>, ApiError> {
    let image = Image::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
    stream_rendition(&image.preview_path).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_images))
        .route(
            "/{id}",
            get(list_entries::<Image>)
                .post(upload_images_to_gallery)
                .delete(delete_entry::<Image>),
        )
        .route("/{id}/thumbnail", get(serve_thumbnail))
        .route("/{id}/preview", get(serve_preview))
        .route("/{id}/fullSize", get(serve_full_size))
        .merge(gallery_entries::common_router::<Image>())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
