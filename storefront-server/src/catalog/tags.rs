//! Filter-Tag Formatter
//!
//! One removable tag per applied value. Price bounds collapse into a single
//! tag and are removed together. Every removal URL drops the page parameter,
//! so removing a filter goes back to page 1.

use super::filter::{Facet, FilterRequest, SelectedFilters};
use super::resolver::Scope;
use super::snapshot::CatalogSnapshot;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub name: String,
    pub value: String,
    pub remove_url: String,
}

struct TagBuilder<'a> {
    request: &'a FilterRequest,
    path: String,
    tags: Vec<ActiveFilter>,
}

impl TagBuilder<'_> {
    /// Drop the whole facet (single-valued facets and price)
    fn push_whole(&mut self, name: &str, value: String, facet: Facet) {
        let mut params = self.request.params_without_page();
        for key in self.request.keys_for(facet) {
            params.remove(key);
        }
        self.push(name, value, params.url(&self.path));
    }

    /// Drop one value from the parameter the client used for this facet
    fn push_value(&mut self, name: &str, value: String, facet: Facet, same: impl Fn(&str) -> bool) {
        let mut params = self.request.params_without_page();
        for key in self.request.keys_for(facet) {
            params.remove_where(key, &same);
        }
        self.push(name, value, params.url(&self.path));
    }

    fn push(&mut self, name: &str, value: String, remove_url: String) {
        self.tags.push(ActiveFilter {
            name: name.to_string(),
            value,
            remove_url,
        });
    }
}

/// Tags for the filters in `selected`
///
/// Category tags show the category title; ids unknown to the catalog produce
/// no tag.
pub fn build_active_filters(
    request: &FilterRequest,
    selected: &SelectedFilters,
    snapshot: &CatalogSnapshot,
    scope: Scope,
) -> Vec<ActiveFilter> {
    let mut b = TagBuilder {
        request,
        path: scope.path(),
        tags: Vec::new(),
    };

    if let Some(q) = &selected.q {
        b.push_whole("Search", q.clone(), Facet::Search);
    }

    let price = match (&selected.price_min, &selected.price_max) {
        (Some(min), Some(max)) => Some(format!("{min}–{max}")),
        (Some(min), None) => Some(format!("From {min}")),
        (None, Some(max)) => Some(format!("Up to {max}")),
        (None, None) => None,
    };
    if let Some(price) = price {
        b.push_whole("Price", price, Facet::Price);
    }

    for id in &selected.categories {
        if let Some(category) = snapshot.category(*id) {
            let id = *id;
            b.push_value("Category", category.title.clone(), Facet::Category, move |v| {
                v.trim().parse::<i64>().ok() == Some(id)
            });
        }
    }

    for (name, facet, values) in [
        ("Size", Facet::Size, &selected.sizes),
        ("Color", Facet::Color, &selected.colors),
        ("Brand", Facet::Brand, &selected.brands),
        ("Season", Facet::Season, &selected.seasons),
        ("Material", Facet::Material, &selected.materials),
    ] {
        for value in values {
            b.push_value(name, value.clone(), facet, |v| v.trim() == value.as_str());
        }
    }

    if selected.sale {
        b.push_whole("Sale", "Sale only".to_string(), Facet::Sale);
    }

    for rating in &selected.ratings {
        let rating = *rating;
        b.push_value("Rating", format!("{rating}+"), Facet::Rating, move |v| {
            v.trim().parse::<i64>().ok() == Some(rating)
        });
    }

    b.tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::resolve;
    use crate::catalog::testing::{entry, snapshot_with};
    use shared::models::Category;

    fn request(raw: &[(&str, &str)]) -> FilterRequest {
        let pairs: Vec<(String, String)> =
            raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        FilterRequest::from_pairs(&pairs)
    }

    fn tags(raw: &[(&str, &str)], scope: Scope) -> Vec<ActiveFilter> {
        let snap = snapshot_with(
            vec![entry(1, 10.0)],
            vec![Category { id: 4, title: "Shoes".into(), slug: "shoes".into() }],
        );
        let req = request(raw);
        let res = resolve(&snap, &req, scope);
        build_active_filters(&req, &res.selected, &snap, scope)
    }

    #[test]
    fn test_one_tag_per_value() {
        let tags = tags(
            &[("size", "S"), ("size", "M"), ("size", "L"), ("page", "3")],
            Scope::Category(4),
        );
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[1].name, "Size");
        assert_eq!(tags[1].value, "M");
        assert_eq!(tags[1].remove_url, "/category/4/?size=S&size=L");
    }

    #[test]
    fn test_last_value_drops_parameter() {
        let tags = tags(&[("brand", "Acme"), ("page", "2")], Scope::Shop);
        assert_eq!(tags[0].remove_url, "/shop/");
    }

    #[test]
    fn test_price_collapses_and_removes_both() {
        let found = tags(
            &[("price_min", "10"), ("price_max", "20"), ("q", "red")],
            Scope::Shop,
        );
        let price = found.iter().find(|t| t.name == "Price").unwrap();
        assert_eq!(price.value, "10–20");
        assert_eq!(price.remove_url, "/shop/?q=red");

        let only_min = tags(&[("price_min", "5"), ("price_max", "oops")], Scope::Shop);
        assert_eq!(only_min[0].value, "From 5");
        assert_eq!(only_min[0].remove_url, "/shop/");

        let only_max = tags(&[("max_price", "7.5")], Scope::Shop);
        assert_eq!(only_max[0].value, "Up to 7.5");
    }

    #[test]
    fn test_category_tag_uses_title_and_alias() {
        let tags = tags(
            &[("categories[]", "4"), ("categories[]", "99"), ("sort", "price_asc")],
            Scope::Shop,
        );
        // 99 is not a known category
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value, "Shoes");
        assert_eq!(tags[0].remove_url, "/shop/?categories%5B%5D=99&sort=price_asc");
    }

    #[test]
    fn test_search_and_sale_labels() {
        let tags = tags(&[("q", "linen"), ("sale", "true")], Scope::Category(4));
        assert_eq!(tags[0].name, "Search");
        assert_eq!(tags[0].remove_url, "/category/4/?sale=true");
        assert_eq!(tags[1].name, "Sale");
        assert_eq!(tags[1].value, "Sale only");
        assert_eq!(tags[1].remove_url, "/category/4/?q=linen");
    }

    #[test]
    fn test_no_filters_no_tags() {
        assert!(tags(&[("sort", "rating"), ("page", "2")], Scope::Shop).is_empty());
    }
}
