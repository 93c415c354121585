//! Facet Resolver
//!
//! Filters the published base set and orders it. Predicates compose with AND
//! across facets and OR within a multi-select facet; each product is tested
//! once, so a product matching several values of one facet still appears
//! once.

use super::filter::{Facet, FilterRequest, SelectedFilters, SortKey};
use super::snapshot::{CatalogEntry, CatalogSnapshot};
use crate::pricing::to_decimal;
use std::cmp::Ordering;

/// Which listing is being filtered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Whole shop: search also matches category titles; rating, stock and
    /// novelty filters are available
    Shop,
    /// One category page
    Category(i64),
}

impl Scope {
    pub fn category_id(&self) -> Option<i64> {
        match self {
            Scope::Shop => None,
            Scope::Category(id) => Some(*id),
        }
    }

    /// Path that removal and share URLs point to
    pub fn path(&self) -> String {
        match self {
            Scope::Shop => "/shop/".to_string(),
            Scope::Category(id) => format!("/category/{id}/"),
        }
    }

    fn supports(&self, facet: Facet) -> bool {
        match facet {
            Facet::Rating | Facet::InStock | Facet::IsNew => *self == Scope::Shop,
            _ => true,
        }
    }
}

/// Filtered, ordered products plus what was applied
#[derive(Debug)]
pub struct Resolution<'a> {
    pub products: Vec<&'a CatalogEntry>,
    pub selected: SelectedFilters,
}

impl Resolution<'_> {
    pub fn ids(&self) -> Vec<i64> {
        self.products.iter().map(|e| e.id()).collect()
    }
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

fn in_list(value: Option<&str>, list: &[String]) -> bool {
    value.is_some_and(|v| list.iter().any(|l| l == v))
}

/// Whether `entry` passes every applied facet except `skip`
pub(crate) fn matches(
    entry: &CatalogEntry,
    request: &FilterRequest,
    scope: Scope,
    skip: Option<Facet>,
) -> bool {
    let active = |facet: Facet| skip != Some(facet) && scope.supports(facet);
    let product = &entry.product;

    if active(Facet::Search)
        && let Some(q) = &request.q
    {
        let q = q.to_lowercase();
        let hit = contains_ci(Some(&product.name), &q)
            || contains_ci(product.description.as_deref(), &q)
            || contains_ci(product.brand.as_deref(), &q)
            || (scope == Scope::Shop && contains_ci(entry.category_title.as_deref(), &q));
        if !hit {
            return false;
        }
    }

    if active(Facet::Price) {
        let price = to_decimal(product.price);
        if request.price_min.as_ref().is_some_and(|(min, _)| price < *min) {
            return false;
        }
        if request.price_max.as_ref().is_some_and(|(max, _)| price > *max) {
            return false;
        }
    }

    if active(Facet::Category)
        && request.categories.is_active()
        && !product
            .category_id
            .is_some_and(|c| request.categories.values.contains(&c))
    {
        return false;
    }

    if active(Facet::Size)
        && request.sizes.is_active()
        && !request.sizes.values.iter().any(|s| entry.offers_size(s))
    {
        return false;
    }

    if active(Facet::Color)
        && request.colors.is_active()
        && !request.colors.values.iter().any(|c| entry.offers_color(c))
    {
        return false;
    }

    for (facet, field, list) in [
        (Facet::Brand, product.brand.as_deref(), &request.brands),
        (Facet::Season, product.season.as_deref(), &request.seasons),
        (Facet::Material, product.material.as_deref(), &request.materials),
    ] {
        if active(facet) && list.is_active() && !in_list(field, &list.values) {
            return false;
        }
    }

    if active(Facet::Sale) && request.sale && !product.is_on_sale() {
        return false;
    }

    if active(Facet::Rating)
        && request.ratings.is_active()
        && !entry
            .reviews
            .max_rating
            .is_some_and(|best| request.ratings.values.iter().any(|r| best >= *r))
    {
        return false;
    }

    if active(Facet::InStock)
        && let Some(wanted) = request.in_stock
        && product.in_stock != wanted
    {
        return false;
    }

    if active(Facet::IsNew) && request.is_new && !product.is_new {
        return false;
    }

    true
}

/// Newest first, then highest id
fn by_date(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    b.product
        .created_at
        .cmp(&a.product.created_at)
        .then(b.id().cmp(&a.id()))
}

fn compare(sort: SortKey, a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    match sort {
        SortKey::PriceAsc => a
            .product
            .price
            .total_cmp(&b.product.price)
            .then(b.id().cmp(&a.id())),
        SortKey::PriceDesc => b
            .product
            .price
            .total_cmp(&a.product.price)
            .then(b.id().cmp(&a.id())),
        SortKey::Popularity => b
            .reviews
            .review_count
            .cmp(&a.reviews.review_count)
            .then_with(|| by_date(a, b)),
        // Unreviewed products go last
        SortKey::Rating => match (a.reviews.avg_rating, b.reviews.avg_rating) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| by_date(a, b)),
        SortKey::Date => by_date(a, b),
    }
}

/// Cleaned values of the facets that actually took part in filtering
fn selected(request: &FilterRequest, scope: Scope) -> SelectedFilters {
    let shop = scope == Scope::Shop;
    SelectedFilters {
        q: request.q.clone(),
        price_min: request.price_min.as_ref().map(|(_, raw)| raw.clone()),
        price_max: request.price_max.as_ref().map(|(_, raw)| raw.clone()),
        categories: request.categories.values.clone(),
        sizes: request.sizes.values.clone(),
        colors: request.colors.values.clone(),
        brands: request.brands.values.clone(),
        seasons: request.seasons.values.clone(),
        materials: request.materials.values.clone(),
        sale: request.sale,
        ratings: if shop { request.ratings.values.clone() } else { Vec::new() },
        in_stock: request.in_stock.filter(|_| shop),
        is_new: request.is_new && shop,
        sort: request.sort,
    }
}

/// Filter and order the published catalog
pub fn resolve<'a>(
    snapshot: &'a CatalogSnapshot,
    request: &FilterRequest,
    scope: Scope,
) -> Resolution<'a> {
    let mut products: Vec<&CatalogEntry> = snapshot
        .base(scope.category_id())
        .filter(|entry| matches(entry, request, scope, None))
        .collect();
    products.sort_by(|a, b| compare(request.sort, a, b));

    tracing::debug!(
        scope = ?scope,
        matched = products.len(),
        sort = ?request.sort,
        "Facet resolution finished"
    );

    Resolution {
        products,
        selected: selected(request, scope),
    }
}
