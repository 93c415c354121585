//! Checkout API (orders and coupons)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::place_order))
        .route("/{order_id}", get(handler::detail))
        .route("/{order_id}/coupon", post(handler::apply_coupon))
}
