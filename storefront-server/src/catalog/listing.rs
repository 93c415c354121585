//! Facet page assembly
//!
//! Glues resolver, tag formatter and paginator into the payload the listing
//! endpoints return after every filter change.

use super::filter::FilterRequest;
use super::pagination::{CATEGORY_PAGE_SIZE, Page, Paginator};
use super::resolver::{Scope, resolve};
use super::snapshot::{CatalogEntry, CatalogSnapshot};
use super::tags::{ActiveFilter, build_active_filters};
use super::filter::SelectedFilters;
use crate::locale::{LocalPrice, ShopperLocale};
use serde::Serialize;

/// Product as shown in a listing grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub brand: Option<String>,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub price: LocalPrice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<LocalPrice>,
    pub on_sale: bool,
    pub in_stock: bool,
    pub is_new: bool,
    pub featured: bool,
    pub review_count: i64,
    pub avg_rating: Option<f64>,
}

impl ProductCard {
    pub fn from_entry(entry: &CatalogEntry, locale: &ShopperLocale) -> Self {
        let product = &entry.product;
        let on_sale = product.is_on_sale();
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            brand: product.brand.clone(),
            category_id: product.category_id,
            category_title: entry.category_title.clone(),
            price: locale.price(product.price),
            regular_price: product
                .regular_price
                .filter(|_| on_sale)
                .map(|regular| locale.price(regular)),
            on_sale,
            in_stock: product.in_stock,
            is_new: product.is_new,
            featured: product.featured,
            review_count: entry.reviews.review_count,
            avg_rating: entry.reviews.avg_rating,
        }
    }
}

/// One page of a filtered listing
#[derive(Debug, Clone, Serialize)]
pub struct FacetPage {
    pub products: Vec<ProductCard>,
    pub active_filters: Vec<ActiveFilter>,
    pub pagination: Page,
    /// Matches across all pages
    pub product_count: usize,
    /// Shareable URL of the current selection, without the page
    pub update_url: String,
    pub page: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub selected_filters: SelectedFilters,
}

/// Resolve, paginate and decorate one listing request
pub fn build_listing(
    snapshot: &CatalogSnapshot,
    request: &FilterRequest,
    scope: Scope,
    locale: &ShopperLocale,
) -> FacetPage {
    let resolution = resolve(snapshot, request, scope);
    let per_page = match scope {
        Scope::Shop => request.per_page,
        Scope::Category(_) => CATEGORY_PAGE_SIZE,
    };
    let page = Paginator::new(resolution.products.len(), per_page).get_page(request.page.as_deref());

    let products = page
        .slice(&resolution.products)
        .iter()
        .map(|entry| ProductCard::from_entry(entry, locale))
        .collect();
    let active_filters = build_active_filters(request, &resolution.selected, snapshot, scope);

    FacetPage {
        products,
        active_filters,
        product_count: resolution.products.len(),
        update_url: request.params_without_page().url(&scope.path()),
        page: page.page,
        has_next: page.has_next,
        has_previous: page.has_previous,
        pagination: page,
        selected_filters: resolution.selected,
    }
}
