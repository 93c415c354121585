//! Catalog browsing
//!
//! # Structure
//!
//! - [`snapshot`] - in-memory copy of the published catalog
//! - [`filter`] - raw query bag → typed [`FilterRequest`]
//! - [`resolver`] - filtering and ordering (Facet Resolver)
//! - [`options`] - facet option lists and faceted counts
//! - [`tags`] - removable active-filter tags (Filter-Tag Formatter)
//! - [`pagination`] - page slicing
//! - [`listing`] - the combined facet page payload

pub mod filter;
pub mod listing;
pub mod options;
pub mod pagination;
pub mod resolver;
pub mod snapshot;
pub mod tags;

pub use filter::{FilterRequest, QueryParams, SelectedFilters, SortKey};
pub use listing::{FacetPage, ProductCard, build_listing};
pub use options::{FilterOptions, facet_counts, get_filter_options};
pub use pagination::{Page, Paginator};
pub use resolver::{Resolution, Scope, resolve};
pub use snapshot::{CatalogEntry, CatalogService, CatalogSnapshot};
pub use tags::{ActiveFilter, build_active_filters};

#[cfg(test)]
pub(crate) mod testing {
    //! Snapshot builders for resolver, option and tag tests

    use super::snapshot::{CatalogEntry, CatalogSnapshot};
    use shared::models::{
        Category, Product, ProductOption, ProductStatus, ProductVariant, ReviewStats,
    };
    use std::collections::HashMap;

    /// Published product `Product {id}` created at `id`, no category
    pub fn entry(id: i64, price: f64) -> CatalogEntry {
        CatalogEntry {
            product: Product {
                id,
                vendor_id: None,
                category_id: None,
                name: format!("Product {id}"),
                slug: format!("product-{id}"),
                description: None,
                brand: None,
                season: None,
                material: None,
                price,
                regular_price: None,
                shipping: 0.0,
                stock: 10,
                status: ProductStatus::Published,
                featured: false,
                is_new: false,
                in_stock: true,
                created_at: id,
            },
            category_title: None,
            variants: Vec::new(),
            options: Vec::new(),
            reviews: ReviewStats {
                product_id: id,
                ..Default::default()
            },
        }
    }

    pub fn variant(product_id: i64, size: &str, color: &str, available: bool) -> ProductVariant {
        ProductVariant {
            id: product_id * 100 + size.len() as i64 + color.len() as i64,
            product_id,
            size: Some(size.to_string()),
            color: Some(color.to_string()),
            color_code: None,
            stock: 5,
            is_available: available,
            price_modifier: 0.0,
        }
    }

    pub fn option(
        product_id: i64,
        name: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> ProductOption {
        ProductOption {
            id: product_id * 1000,
            product_id,
            name: name.to_string(),
            title: title.map(str::to_string),
            content: content.map(str::to_string),
        }
    }

    pub fn snapshot(entries: Vec<CatalogEntry>) -> CatalogSnapshot {
        snapshot_with(entries, Vec::new())
    }

    /// Snapshot built without the database, sorted newest first like the loader
    pub fn snapshot_with(mut entries: Vec<CatalogEntry>, mut categories: Vec<Category>) -> CatalogSnapshot {
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        let titles: HashMap<i64, String> =
            categories.iter().map(|c| (c.id, c.title.clone())).collect();

        let mut category_counts: HashMap<i64, i64> = HashMap::new();
        for e in &mut entries {
            if let Some(category_id) = e.product.category_id {
                *category_counts.entry(category_id).or_default() += 1;
                if e.category_title.is_none() {
                    e.category_title = titles.get(&category_id).cloned();
                }
            }
        }
        entries.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then(b.id().cmp(&a.id()))
        });

        CatalogSnapshot {
            products: entries,
            categories,
            category_counts,
            loaded_at: 0,
        }
    }
}
