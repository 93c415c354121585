//! Payments API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/payments/stripe/{order_id}/session | POST | start Stripe Checkout |
//! | /api/payments/{method}/{order_id}/start | POST | start a payment, issue its reference |
//! | /api/payments/{method}/{order_id}/verify | GET, POST | gateway confirmation |
//! | /api/payment_status/{order_id} | GET | status page data |
//!
//! Redirect-based gateways come back with a GET and the fields in the query
//! string; widget-based ones POST a JSON body.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payments/stripe/{order_id}/session", post(handler::stripe_session))
        .route("/api/payments/{method}/{order_id}/start", post(handler::start))
        .route(
            "/api/payments/{method}/{order_id}/verify",
            get(handler::verify_redirect).post(handler::verify_callback),
        )
        .route("/api/payment_status/{order_id}", get(handler::payment_status))
}
