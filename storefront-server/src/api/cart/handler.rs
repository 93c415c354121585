//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::context::{CART_TOKEN_HEADER, ShopperContext};
use crate::api::validated;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{CartLineUpsert, CartSummary};

/// Add/update body
#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(range(min = 1))]
    pub product_id: i64,
    pub qty: i64,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub size: Option<String>,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub color: Option<String>,
}

impl From<AddToCartRequest> for CartLineUpsert {
    fn from(req: AddToCartRequest) -> Self {
        CartLineUpsert {
            product_id: req.product_id,
            qty: req.qty,
            size: req.size,
            color: req.color,
        }
    }
}

/// GET /api/cart - lines and totals of the caller's cart
pub async fn summary(
    State(state): State<ServerState>,
    ctx: ShopperContext,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let summary = state.carts.list(ctx.cart_token_or_empty()).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// POST /api/cart/items - add a product or overwrite its line
///
/// A caller without a cart token gets a new one back in `x-cart-token`.
pub async fn add(
    State(state): State<ServerState>,
    ctx: ShopperContext,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<impl IntoResponse> {
    let payload = validated(payload)?;
    let token = ctx
        .cart_token
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    let result = state
        .carts
        .add_or_update(&token, ctx.customer_id, payload.into())
        .await?;
    let message = result.message.clone();
    Ok((
        [(CART_TOKEN_HEADER, token)],
        Json(ApiResponse::success_with_message(message, result)),
    ))
}

/// DELETE /api/cart/items/{line_id} - remove one line
pub async fn remove(
    State(state): State<ServerState>,
    ctx: ShopperContext,
    Path(line_id): Path<i64>,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let summary = state.carts.remove(ctx.cart_token_or_empty(), line_id).await?;
    Ok(Json(ApiResponse::success_with_message("Item deleted", summary)))
}
