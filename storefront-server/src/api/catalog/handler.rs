//! Catalog API Handlers
//!
//! Query strings are taken as ordered `(key, value)` pairs so repeated keys
//! (`size=M&size=L`) survive; malformed values are dropped while parsing.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::context::ShopperContext;
use crate::catalog::{
    CatalogSnapshot, FacetPage, FilterOptions, FilterRequest, Scope, build_listing, facet_counts,
    get_filter_options,
};
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

type Pairs = Query<Vec<(String, String)>>;

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    #[serde(default)]
    category: Option<String>,
}

fn category_scope(snapshot: &CatalogSnapshot, id: i64) -> AppResult<Scope> {
    if snapshot.category(id).is_none() {
        return Err(AppError::new(ErrorCode::CategoryNotFound).with_detail("category", id));
    }
    Ok(Scope::Category(id))
}

async fn listing(
    state: &ServerState,
    snapshot: &CatalogSnapshot,
    ctx: &ShopperContext,
    pairs: &[(String, String)],
    scope: Scope,
) -> FacetPage {
    let request = FilterRequest::from_pairs(pairs);
    let locale = state.locale.resolve(ctx.ip, ctx.currency).await;
    build_listing(snapshot, &request, scope, &locale)
}

/// GET /api/shop - shop-wide facet search
pub async fn shop(
    State(state): State<ServerState>,
    ctx: ShopperContext,
    Query(pairs): Pairs,
) -> AppResult<Json<ApiResponse<FacetPage>>> {
    let snapshot = state.catalog.current().await?;
    let page = listing(&state, &snapshot, &ctx, &pairs, Scope::Shop).await;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/category/{id} - facet search inside one category
pub async fn category(
    State(state): State<ServerState>,
    ctx: ShopperContext,
    Path(id): Path<i64>,
    Query(pairs): Pairs,
) -> AppResult<Json<ApiResponse<FacetPage>>> {
    let snapshot = state.catalog.current().await?;
    let scope = category_scope(&snapshot, id)?;
    let page = listing(&state, &snapshot, &ctx, &pairs, scope).await;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/filters - facet options, optionally for one category
pub async fn filter_options(
    State(state): State<ServerState>,
    Query(query): Query<OptionsQuery>,
) -> AppResult<Json<ApiResponse<FilterOptions>>> {
    // an unparsable category means the whole shop
    let category_id = query.category.as_deref().and_then(|c| c.trim().parse::<i64>().ok());
    let snapshot = state.catalog.current().await?;
    Ok(Json(ApiResponse::success(get_filter_options(&snapshot, category_id))))
}

/// GET /api/filters/counts - facet counts for the current shop selection
pub async fn shop_counts(
    State(state): State<ServerState>,
    Query(pairs): Pairs,
) -> AppResult<Json<ApiResponse<FilterOptions>>> {
    let request = FilterRequest::from_pairs(&pairs);
    let snapshot = state.catalog.current().await?;
    Ok(Json(ApiResponse::success(facet_counts(&snapshot, &request, Scope::Shop))))
}

/// GET /api/category/{id}/counts - facet counts inside one category
pub async fn category_counts(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(pairs): Pairs,
) -> AppResult<Json<ApiResponse<FilterOptions>>> {
    let snapshot = state.catalog.current().await?;
    let scope = category_scope(&snapshot, id)?;
    let request = FilterRequest::from_pairs(&pairs);
    Ok(Json(ApiResponse::success(facet_counts(&snapshot, &request, scope))))
}
