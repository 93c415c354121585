//! Checkout API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::context::ShopperContext;
use crate::core::ServerState;
use crate::coupons::{CouponOutcome, CouponStatus};
use crate::utils::{ApiResponse, AppResult};
use shared::models::{CheckoutRequest, CouponRequest, OrderDetail};

/// POST /api/checkout - turn the caller's cart into an order
pub async fn place_order(
    State(state): State<ServerState>,
    ctx: ShopperContext,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let customer_id = ctx.customer()?;
    let detail = state
        .checkout
        .place_order(ctx.cart_token_or_empty(), payload.address, customer_id)
        .await?;
    Ok(Json(ApiResponse::success_with_message("Order placed", detail)))
}

/// GET /api/checkout/{order_id} - order with items and coupons
pub async fn detail(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = state.checkout.detail(&order_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /api/checkout/{order_id}/coupon - apply a vendor coupon
pub async fn apply_coupon(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Json(payload): Json<CouponRequest>,
) -> AppResult<Json<ApiResponse<CouponOutcome>>> {
    let outcome = state
        .coupons
        .apply(&order_id, payload.coupon_code.as_deref())
        .await?;
    let message = match outcome.status {
        CouponStatus::Applied => "Coupon activated",
        CouponStatus::AlreadyApplied => "Coupon already activated",
        CouponStatus::NoMatchingItems => "Coupon does not apply to any item of this order",
    };
    Ok(Json(ApiResponse::success_with_message(message, outcome)))
}
