use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::AppState;

pub mod gallery_entries;
pub mod health;
pub mod images;
pub mod videos;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .nest("/image", images::router())
        .nest("/video", videos::router());

    Router::new()
        .nest("/v1", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
