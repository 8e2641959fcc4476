//! Video routes. Videos are link records rather than uploaded assets, so
//! creation is a plain JSON POST; everything else is the common entry
//! surface.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use chrono::Utc;
use db::models::{
    user::Restrictions,
    video::{CreateVideo, Video},
};
use serde::Deserialize;
use tracing::info;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::gallery_entries::{self, delete_entry, list_entries};
use crate::{AppState, error::ApiError, middleware::AuthSession};

#[derive(Debug, Deserialize, TS)]
pub struct AddVideo {
    pub url: String,
}

/// POST /v1/video/{gallery_id} - register an externally hosted video.
///
/// Authorship comes from the session; capture time is the registration
/// time, there is no embedded metadata to read.
pub async fn create_video(
    State(state): State<AppState>,
    Path(gallery_id): Path<Uuid>,
    session: AuthSession,
    Json(payload): Json<AddVideo>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Video>>), ApiError> {
    let user = session.require_any(Restrictions::WRITE_IMAGES, "add videos")?;

    let data = CreateVideo {
        url: payload.url,
        author_cid: user.cid.clone(),
        author: Some(user.fullname.clone()),
        gallery_id: Some(gallery_id),
        shot_at: Utc::now(),
    };
    let video = Video::create(&state.db().pool, &data, Uuid::new_v4()).await?;

    info!("User {} added video {} to gallery {gallery_id}", user.cid, video.core.id);
    Ok((
        StatusCode::ACCEPTED,
        ResponseJson(ApiResponse::success(video)),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(list_entries::<Video>)
                .post(create_video)
                .delete(delete_entry::<Video>),
        )
        .merge(gallery_entries::common_router::<Video>())
}
