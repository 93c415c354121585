//! API routes
//!
//! # Structure
//!
//! - [`context`] - [`ShopperContext`] extractor (cart token, customer, IP, currency)
//! - [`health`] - liveness
//! - [`catalog`] - shop and category facet search, filter options and counts
//! - [`cart`] - cart lines
//! - [`checkout`] - orders and coupons
//! - [`payments`] - gateway confirmation and status page
//! - [`track`] - order tracker
//! - [`locale`] - shopper currency
//! - [`notifications`] - customer notifications

pub mod context;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod locale;
pub mod notifications;
pub mod payments;
pub mod track;

pub use context::ShopperContext;

use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Run `validator` rules on a request body
pub fn validated<T: Validate>(body: T) -> AppResult<T> {
    body.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(body)
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(catalog::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(payments::router())
        .merge(track::router())
        .merge(locale::router())
        .merge(notifications::router())
}

/// Build the application with middleware
///
/// Used by the HTTP server and by oneshot tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // CORS - storefront pages live on another origin
        .layer(CorsLayer::permissive())
        // Timeout - bound every request
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        // Trace - request logging
        .layer(TraceLayer::new_for_http())
}
