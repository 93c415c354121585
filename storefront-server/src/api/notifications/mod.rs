//! Notifications API

use axum::{Json, Router, extract::State, routing::get};

use crate::api::context::ShopperContext;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::Notification;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/notifications", get(list))
}

/// GET /api/notifications - the caller's notifications, newest first
pub async fn list(
    State(state): State<ServerState>,
    ctx: ShopperContext,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let customer_id = ctx.customer()?;
    let rows = state.notifications.list_for_customer(customer_id).await?;
    Ok(Json(ApiResponse::success(rows)))
}
