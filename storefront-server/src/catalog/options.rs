//! Facet options and faceted counts
//!
//! Options are computed from the base set (optionally category-scoped), never
//! from the filtered result, so a shopper can always widen a selection again.

use super::filter::{Facet, FilterRequest};
use super::resolver::{Scope, matches};
use super::snapshot::{CatalogEntry, CatalogSnapshot, OPTION_GROUP_COLOR, OPTION_GROUP_SIZE};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOption {
    pub id: i64,
    pub title: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueOption {
    pub value: String,
    /// Display title; differs from `value` for option items with both
    pub title: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorOption {
    pub value: String,
    pub title: String,
    /// Hex code, known only for variant-sourced colours
    pub code: Option<String>,
    pub count: i64,
}

/// Everything a filter sidebar needs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub price_range: PriceRange,
    pub categories: Vec<CategoryOption>,
    pub sizes: Vec<ValueOption>,
    pub colors: Vec<ColorOption>,
    pub brands: Vec<ValueOption>,
    pub seasons: Vec<ValueOption>,
    pub materials: Vec<ValueOption>,
}

fn price_range<'a>(entries: impl Iterator<Item = &'a CatalogEntry>) -> PriceRange {
    entries.fold(None, |acc: Option<PriceRange>, e| {
        let p = e.product.price;
        Some(match acc {
            None => PriceRange { min: p, max: p },
            Some(r) => PriceRange {
                min: r.min.min(p),
                max: r.max.max(p),
            },
        })
    })
    .unwrap_or_default()
}

/// Distinct values of a scalar product field with product counts, sorted
fn field_values(entries: &[&CatalogEntry], field: fn(&CatalogEntry) -> Option<&str>) -> Vec<ValueOption> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for e in entries {
        if let Some(v) = field(e).filter(|v| !v.is_empty()) {
            *counts.entry(v).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(v, count)| ValueOption {
            value: v.to_string(),
            title: v.to_string(),
            count,
        })
        .collect()
}

fn brand(e: &CatalogEntry) -> Option<&str> {
    e.product.brand.as_deref()
}

fn season(e: &CatalogEntry) -> Option<&str> {
    e.product.season.as_deref()
}

fn material(e: &CatalogEntry) -> Option<&str> {
    e.product.material.as_deref()
}

/// Option items first, then variant values not already listed
fn size_options(entries: &[&CatalogEntry]) -> Vec<ValueOption> {
    let mut titles: BTreeMap<String, String> = BTreeMap::new();
    for e in entries {
        for (value, option) in e.option_values(OPTION_GROUP_SIZE) {
            titles
                .entry(value.to_string())
                .or_insert_with(|| option.title.clone().unwrap_or_else(|| value.to_string()));
        }
    }
    for e in entries {
        for size in e.available_sizes() {
            titles.entry(size.to_string()).or_insert_with(|| size.to_string());
        }
    }
    titles
        .into_iter()
        .map(|(value, title)| {
            let count = entries.iter().filter(|e| e.offers_size(&value)).count() as i64;
            ValueOption { value, title, count }
        })
        .collect()
}

fn color_options(entries: &[&CatalogEntry]) -> Vec<ColorOption> {
    let mut colors: BTreeMap<String, (String, Option<String>)> = BTreeMap::new();
    for e in entries {
        for (value, option) in e.option_values(OPTION_GROUP_COLOR) {
            colors.entry(value.to_string()).or_insert_with(|| {
                (option.title.clone().unwrap_or_else(|| value.to_string()), None)
            });
        }
    }
    for e in entries {
        for (color, code) in e.available_colors() {
            colors
                .entry(color.to_string())
                .or_insert_with(|| (color.to_string(), code.map(str::to_string)));
        }
    }
    colors
        .into_iter()
        .map(|(value, (title, code))| {
            let count = entries.iter().filter(|e| e.offers_color(&value)).count() as i64;
            ColorOption { value, title, code, count }
        })
        .collect()
}

/// Filter options for the shop (no category) or one category page
///
/// Price range and category counts always cover the whole published catalog;
/// size, colour, brand, season and material lists follow the category scope.
pub fn get_filter_options(snapshot: &CatalogSnapshot, category_id: Option<i64>) -> FilterOptions {
    let scoped: Vec<&CatalogEntry> = snapshot.base(category_id).collect();

    FilterOptions {
        price_range: price_range(snapshot.base(None)),
        categories: snapshot
            .categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id,
                title: c.title.clone(),
                count: snapshot.category_counts.get(&c.id).copied().unwrap_or(0),
            })
            .collect(),
        sizes: size_options(&scoped),
        colors: color_options(&scoped),
        brands: field_values(&scoped, brand),
        seasons: field_values(&scoped, season),
        materials: field_values(&scoped, material),
    }
}

/// Per-value counts for the current selection
///
/// The count for a value of facet F is the number of products matching every
/// applied filter except F, restricted to that value. Selecting a brand thus
/// narrows size counts but leaves the other brand counts untouched.
pub fn facet_counts(snapshot: &CatalogSnapshot, request: &FilterRequest, scope: Scope) -> FilterOptions {
    let base: Vec<&CatalogEntry> = snapshot.base(scope.category_id()).collect();
    let without = |facet: Facet| {
        base.iter()
            .copied()
            .filter(|e| matches(e, request, scope, Some(facet)))
            .collect::<Vec<_>>()
    };
    let options = get_filter_options(snapshot, scope.category_id());

    let by_category = without(Facet::Category);
    let by_size = without(Facet::Size);
    let by_color = without(Facet::Color);
    let by_brand = without(Facet::Brand);
    let by_season = without(Facet::Season);
    let by_material = without(Facet::Material);

    let recount = |values: Vec<ValueOption>, pool: &[&CatalogEntry], field: fn(&CatalogEntry) -> Option<&str>| {
        values
            .into_iter()
            .map(|mut o| {
                o.count = pool.iter().filter(|e| field(e) == Some(o.value.as_str())).count() as i64;
                o
            })
            .collect::<Vec<_>>()
    };

    let matched: BTreeSet<i64> = base
        .iter()
        .filter(|e| matches(e, request, scope, None))
        .map(|e| e.id())
        .collect();
    let price_range = price_range(base.iter().copied().filter(|e| matched.contains(&e.id())));

    FilterOptions {
        price_range,
        categories: options
            .categories
            .into_iter()
            .map(|mut c| {
                c.count = by_category
                    .iter()
                    .filter(|e| e.product.category_id == Some(c.id))
                    .count() as i64;
                c
            })
            .collect(),
        sizes: options
            .sizes
            .into_iter()
            .map(|mut o| {
                o.count = by_size.iter().filter(|e| e.offers_size(&o.value)).count() as i64;
                o
            })
            .collect(),
        colors: options
            .colors
            .into_iter()
            .map(|mut o| {
                o.count = by_color.iter().filter(|e| e.offers_color(&o.value)).count() as i64;
                o
            })
            .collect(),
        brands: recount(options.brands, &by_brand, brand),
        seasons: recount(options.seasons, &by_season, season),
        materials: recount(options.materials, &by_material, material),
    }
}
