use axum::{extract::State, response::Json as ResponseJson};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /v1/health - liveness check that also exercises the database.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<&'static str>>, ApiError> {
    sqlx::query("SELECT 1").execute(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success("OK")))
}
