//! Catalog API (facet search)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/shop", get(handler::shop))
        .route("/api/category/{id}", get(handler::category))
        .route("/api/category/{id}/counts", get(handler::category_counts))
        .route("/api/filters", get(handler::filter_options))
        .route("/api/filters/counts", get(handler::shop_counts))
}
