//! Order tracker API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::checkout::track;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::TrackingInfo;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/track/{code}", get(track_item))
}

/// GET /api/track/{code} - order item by item id or carrier tracking id
pub async fn track_item(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<ApiResponse<TrackingInfo>>> {
    let info = track(&state.pool, &code).await?;
    Ok(Json(ApiResponse::success(info)))
}
