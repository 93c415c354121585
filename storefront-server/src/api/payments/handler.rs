//! Payments API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::payments::{Payload, PaymentOutcome, PaymentStart, StripeSession};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::Order;

#[derive(Debug, Serialize)]
pub struct PaymentStatusView {
    pub order: Order,
    /// `paid | failed` as carried by the status redirect, if any
    pub outcome: Option<String>,
}

async fn confirm(
    state: &ServerState,
    method: &str,
    order_id: &str,
    payload: &Payload,
) -> AppResult<Json<ApiResponse<PaymentOutcome>>> {
    let outcome = state.payments.confirm(order_id, method, payload).await?;
    if !outcome.is_paid() {
        return Err(AppError::new(ErrorCode::PaymentNotConfirmed)
            .with_detail("order_id", order_id)
            .with_detail("redirect", outcome.redirect));
    }
    Ok(Json(ApiResponse::success_with_message("Payment confirmed", outcome)))
}

/// POST /api/payments/stripe/{order_id}/session - create a Checkout Session
pub async fn stripe_session(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<ApiResponse<StripeSession>>> {
    let session = state.payments.start_stripe_checkout(&order_id).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// POST /api/payments/{method}/{order_id}/start - begin a payment
pub async fn start(
    State(state): State<ServerState>,
    Path((method, order_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<PaymentStart>>> {
    let start = state.payments.start_checkout(&order_id, &method).await?;
    Ok(Json(ApiResponse::success(start)))
}

/// GET /api/payments/{method}/{order_id}/verify - gateway redirect back
pub async fn verify_redirect(
    State(state): State<ServerState>,
    Path((method, order_id)): Path<(String, String)>,
    Query(payload): Query<Payload>,
) -> AppResult<Json<ApiResponse<PaymentOutcome>>> {
    confirm(&state, &method, &order_id, &payload).await
}

/// POST /api/payments/{method}/{order_id}/verify - gateway or widget callback
///
/// Body fields win over query fields of the same name.
pub async fn verify_callback(
    State(state): State<ServerState>,
    Path((method, order_id)): Path<(String, String)>,
    Query(mut payload): Query<Payload>,
    Json(body): Json<Payload>,
) -> AppResult<Json<ApiResponse<PaymentOutcome>>> {
    payload.extend(body);
    confirm(&state, &method, &order_id, &payload).await
}

/// GET /api/payment_status/{order_id} - order for the status page
pub async fn payment_status(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
    Query(query): Query<Payload>,
) -> AppResult<Json<ApiResponse<PaymentStatusView>>> {
    let order = state.payments.payment_status(&order_id).await?;
    Ok(Json(ApiResponse::success(PaymentStatusView {
        order,
        outcome: query.get("payment_status").cloned(),
    })))
}
