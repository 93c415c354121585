//! Locale API

use axum::{Json, Router, extract::State, routing::get};

use crate::api::context::ShopperContext;
use crate::core::ServerState;
use crate::locale::ShopperLocale;
use crate::utils::{ApiResponse, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/locale", get(current))
}

/// GET /api/locale - country and display currency for the caller
pub async fn current(
    State(state): State<ServerState>,
    ctx: ShopperContext,
) -> AppResult<Json<ApiResponse<ShopperLocale>>> {
    let locale = state.locale.resolve(ctx.ip, ctx.currency).await;
    Ok(Json(ApiResponse::success(locale)))
}
