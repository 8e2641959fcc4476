//! Routes common to every gallery entry kind.
//!
//! The original admin surface exposes the same tag/author/thumbnail
//! operations for images and videos; the handlers here are generic over the
//! [`GalleryEntry`] trait and mounted once per kind.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    gallery_entry::GalleryEntry,
    image_tag::ImageTag,
    user::{Restrictions, User},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use utils::response::ApiResponse;
use utils::sanitize::normalize_tag;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthSession};

#[derive(Debug, Deserialize, TS)]
pub struct AddTag {
    #[serde(rename = "tagName")]
    pub tag_name: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct ChangeAuthor {
    #[serde(rename = "newCid")]
    pub new_cid: String,
}

/// GET /v1/{kind}/{gallery_id} - entries of a gallery, capture order.
pub async fn list_entries<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(gallery_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<M>>>, ApiError> {
    let entries = M::find_by_gallery(&state.db().pool, gallery_id).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// GET /v1/{kind}/{id}/details - a single entry.
pub async fn get_entry<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<M>>, ApiError> {
    let entry = M::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// GET /v1/{kind}/{id}/tags - the entry's denormalized tag records.
pub async fn get_entry_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ImageTag>>>, ApiError> {
    let tags = ImageTag::find_by_image(&state.db().pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(tags)))
}

/// GET /v1/{kind}/{id}/author - the entry's display author.
pub async fn get_entry_author<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Option<String>>>, ApiError> {
    let entry = M::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
    Ok(ResponseJson(ApiResponse::success(entry.core().author.clone())))
}

/// POST /v1/{kind}/{id}/tags - add a tag, maintaining both representations.
///
/// Two separate writes: the join record first, then the entry's own tags
/// array. There is no atomicity between them; a failure in between leaves
/// the copies inconsistent.
pub async fn add_tag<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddTag>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<ImageTag>>), ApiError> {
    let pool = &state.db().pool;
    let tag_name = normalize_tag(&payload.tag_name);

    let tag = ImageTag::create(pool, id, &tag_name).await?;

    let entry = M::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;
    let mut tags = entry.core().tags.0.clone();
    tags.push(tag_name.clone());
    M::update_tags(pool, id, &tags).await?;

    info!("Added tag {tag_name} to entry {id}");
    Ok((StatusCode::ACCEPTED, ResponseJson(ApiResponse::success(tag))))
}

/// POST /v1/{kind}/{id}/author - reassign the author, resolving the display
/// name through the user directory.
pub async fn change_author<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: AuthSession,
    Json(payload): Json<ChangeAuthor>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<()>>), ApiError> {
    session.require_any(
        Restrictions::WRITE_GALLERY | Restrictions::WRITE_IMAGES,
        "change author",
    )?;

    let pool = &state.db().pool;
    let user = User::find_by_cid(pool, &payload.new_cid)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;

    M::update_author(pool, id, &user.cid, Some(&user.fullname)).await?;

    info!("Changed author to {} for gallery entry {id}", user.fullname);
    Ok((StatusCode::ACCEPTED, ResponseJson(ApiResponse::success(()))))
}

/// POST /v1/{kind}/{id}/gallerythumbnail - make this entry its gallery's
/// thumbnail, clearing any previous holder.
///
/// Three independent statements, not a transaction; concurrent selections
/// on the same gallery can race. Accepted limitation.
pub async fn set_gallery_thumbnail<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: AuthSession,
) -> Result<(StatusCode, ResponseJson<ApiResponse<()>>), ApiError> {
    session.require_any(
        Restrictions::WRITE_GALLERY | Restrictions::WRITE_IMAGES,
        "change thumbnail",
    )?;

    let pool = &state.db().pool;
    let new_thumb = M::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::Database(sqlx::Error::RowNotFound))?;

    let old_thumbs = M::find_gallery_thumbnails(pool, new_thumb.core().gallery_id).await?;
    for old in &old_thumbs {
        M::set_gallery_thumbnail(pool, old.core().id, false).await?;
    }

    M::set_gallery_thumbnail(pool, id, true).await?;

    info!(
        "Changed gallery thumbnail to {id} for gallery {:?}",
        new_thumb.core().gallery_id
    );
    Ok((StatusCode::ACCEPTED, ResponseJson(ApiResponse::success(()))))
}

/// GET /v1/{kind}/tags/{tag_name}/search - entries carrying a tag.
pub async fn search_by_tag<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
) -> Result<ResponseJson<ApiResponse<Vec<M>>>, ApiError> {
    let pool = &state.db().pool;
    let tag_name = tag_name.to_lowercase();

    let tags = ImageTag::find_by_tag(pool, &tag_name).await?;
    let ids: Vec<Uuid> = tags.iter().map(|t| t.image_id).collect();
    let entries = M::find_by_ids(pool, &ids).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// DELETE /v1/{kind}/{id} - remove the record only. Rendition files and
/// ImageTag rows are not cascaded.
pub async fn delete_entry<M: GalleryEntry + Serialize>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: AuthSession,
) -> Result<(StatusCode, ResponseJson<ApiResponse<()>>), ApiError> {
    let user = session.require_any(
        Restrictions::WRITE_IMAGES | Restrictions::WRITE_GALLERY,
        "remove entry",
    )?;

    let rows_affected = M::delete(&state.db().pool, id).await?;
    if rows_affected == 0 {
        return Err(ApiError::Database(sqlx::Error::RowNotFound));
    }

    info!("User {} removed entry {id}", user.cid);
    Ok((StatusCode::ACCEPTED, ResponseJson(ApiResponse::success(()))))
}

/// Routes shared verbatim between entry kinds. The `/{id}` method router is
/// left to each kind, which needs to add its own POST handler there.
pub fn common_router<M: GalleryEntry + Serialize>() -> Router<AppState> {
    Router::new()
        .route("/{id}/details", get(get_entry::<M>))
        .route("/{id}/tags", get(get_entry_tags).post(add_tag::<M>))
        .route(
            "/{id}/author",
            get(get_entry_author::<M>).post(change_author::<M>),
        )
        .route(
            "/{id}/gallerythumbnail",
            axum::routing::post(set_gallery_thumbnail::<M>),
        )
        .route("/tags/{tag_name}/search", get(search_by_tag::<M>))
}
