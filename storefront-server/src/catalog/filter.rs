//! Typed filter request
//!
//! The raw query string is an ordered, multi-valued bag of strings. It is
//! parsed once into a [`FilterRequest`]; malformed values are dropped here and
//! never reach the resolver. The raw pairs are kept so removal URLs can be
//! rebuilt from exactly what the client sent.

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `key`, in order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Drop every value of `key`
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Drop the values of `key` matching `pred`
    pub fn remove_where(&mut self, key: &str, pred: impl Fn(&str) -> bool) {
        self.pairs.retain(|(k, v)| k != key || !pred(v));
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `a=1&b=x%20y`, keys and values percent-encoded
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path` plus `?query` when there is one
    pub fn url(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.to_query_string())
        }
    }
}

/// Sort order of the resolved product sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    /// Most reviews first
    #[default]
    Popularity,
    /// Best average rating first
    Rating,
    /// Newest first
    Date,
}

impl SortKey {
    /// Absent → popularity, anything unrecognized → date
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => SortKey::Popularity,
            Some("price_asc") => SortKey::PriceAsc,
            Some("price_desc") => SortKey::PriceDesc,
            Some("popularity") => SortKey::Popularity,
            Some("rating") => SortKey::Rating,
            Some(_) => SortKey::Date,
        }
    }
}

/// Filterable dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Search,
    Price,
    Category,
    Size,
    Color,
    Brand,
    Season,
    Material,
    Sale,
    Rating,
    InStock,
    IsNew,
}

const Q_KEYS: &[&str] = &["q", "searchFilter"];
const PRICE_MIN_KEYS: &[&str] = &["price_min", "min_price"];
const PRICE_MAX_KEYS: &[&str] = &["price_max", "max_price"];
const CATEGORY_KEYS: &[&str] = &["category", "categories[]", "categories"];
const SIZE_KEYS: &[&str] = &["size", "sizes[]", "sizes"];
const COLOR_KEYS: &[&str] = &["color", "colors[]", "colors"];
const BRAND_KEYS: &[&str] = &["brand", "brands[]", "brands"];
const SEASON_KEYS: &[&str] = &["season", "seasons[]", "seasons"];
const MATERIAL_KEYS: &[&str] = &["material", "materials[]", "materials"];
const SALE_KEYS: &[&str] = &["sale", "has_discount"];
const RATING_KEYS: &[&str] = &["rating", "rating[]"];

pub const PAGE_KEY: &str = "page";
pub const DEFAULT_PER_PAGE: usize = 20;
pub const MAX_PER_PAGE: usize = 100;

/// A multi-select facet value list plus the parameter it came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValue<T> {
    pub values: Vec<T>,
    pub key: Option<&'static str>,
}

impl<T> MultiValue<T> {
    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }
}

/// Parsed filter request
#[derive(Debug, Clone, Default)]
pub struct FilterRequest {
    pub q: Option<String>,
    pub q_key: Option<&'static str>,
    /// Cleaned price bounds, with the raw text kept for display
    pub price_min: Option<(Decimal, String)>,
    pub price_max: Option<(Decimal, String)>,
    pub categories: MultiValue<i64>,
    pub sizes: MultiValue<String>,
    pub colors: MultiValue<String>,
    pub brands: MultiValue<String>,
    pub seasons: MultiValue<String>,
    pub materials: MultiValue<String>,
    pub sale: bool,
    pub sale_key: Option<&'static str>,
    pub ratings: MultiValue<i64>,
    pub in_stock: Option<bool>,
    pub is_new: bool,
    pub sort: SortKey,
    pub page: Option<String>,
    pub per_page: usize,
    pub params: QueryParams,
}

/// First alias with any value wins, even if all its values are blank
fn pick_list(params: &QueryParams, keys: &[&'static str]) -> (Vec<String>, Option<&'static str>) {
    for key in keys {
        let values = params.get_all(key);
        if !values.is_empty() {
            return (values.into_iter().map(str::to_string).collect(), Some(*key));
        }
    }
    (Vec::new(), None)
}

fn pick_one(params: &QueryParams, keys: &[&'static str]) -> Option<(String, &'static str)> {
    keys.iter().find_map(|key| {
        params
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| (v.to_string(), *key))
    })
}

fn clean_strings(params: &QueryParams, keys: &[&'static str]) -> MultiValue<String> {
    let (raw, key) = pick_list(params, keys);
    let mut values: Vec<String> = Vec::new();
    for v in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !values.iter().any(|seen| seen == v) {
            values.push(v.to_string());
        }
    }
    MultiValue { values, key }
}

fn clean_ids(params: &QueryParams, keys: &[&'static str]) -> MultiValue<i64> {
    let (raw, key) = pick_list(params, keys);
    let mut values: Vec<i64> = Vec::new();
    for id in raw.iter().filter_map(|v| v.trim().parse::<i64>().ok()).filter(|id| *id > 0) {
        if !values.contains(&id) {
            values.push(id);
        }
    }
    MultiValue { values, key }
}

/// Decimal from plain or scientific notation; anything else is ignored
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "1" | "True" | "TRUE")
}

impl FilterRequest {
    /// Parse the raw query bag. Never fails: malformed input is dropped.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self::from_params(QueryParams::new(pairs.to_vec()))
    }

    pub fn from_params(params: QueryParams) -> Self {
        let (q, q_key) = match pick_one(&params, Q_KEYS) {
            Some((q, key)) => (Some(q), Some(key)),
            None => (None, None),
        };

        let price = |keys: &[&'static str]| {
            pick_one(&params, keys).and_then(|(raw, _)| parse_price(&raw).map(|d| (d, raw)))
        };
        let price_min = price(PRICE_MIN_KEYS);
        let price_max = price(PRICE_MAX_KEYS);

        let sale_key = SALE_KEYS
            .iter()
            .find(|k| params.get(k).is_some_and(is_truthy))
            .copied();

        let mut ratings = clean_ids(&params, RATING_KEYS);
        ratings.values.retain(|r| (1..=5).contains(r));

        let in_stock = match params.get("in_stock").map(str::trim) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        let per_page = params
            .get("per_page")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(|n| n.clamp(1, MAX_PER_PAGE))
            .unwrap_or(DEFAULT_PER_PAGE);

        Self {
            q,
            q_key,
            price_min,
            price_max,
            categories: clean_ids(&params, CATEGORY_KEYS),
            sizes: clean_strings(&params, SIZE_KEYS),
            colors: clean_strings(&params, COLOR_KEYS),
            brands: clean_strings(&params, BRAND_KEYS),
            seasons: clean_strings(&params, SEASON_KEYS),
            materials: clean_strings(&params, MATERIAL_KEYS),
            sale: sale_key.is_some(),
            sale_key,
            ratings,
            in_stock,
            is_new: params.get("is_new").map(str::trim) == Some("true"),
            sort: SortKey::parse(params.get("sort")),
            page: params.get(PAGE_KEY).map(str::to_string),
            per_page,
            params,
        }
    }

    /// Parameter names that carry the given facet in this request
    pub fn keys_for(&self, facet: Facet) -> Vec<&'static str> {
        let sent = |keys: &[&'static str]| -> Vec<&'static str> {
            keys.iter().copied().filter(|k| self.params.contains(k)).collect()
        };
        match facet {
            Facet::Search => sent(Q_KEYS),
            Facet::Price => {
                let mut keys = sent(PRICE_MIN_KEYS);
                keys.extend(sent(PRICE_MAX_KEYS));
                keys
            }
            Facet::Category => self.categories.key.into_iter().collect(),
            Facet::Size => self.sizes.key.into_iter().collect(),
            Facet::Color => self.colors.key.into_iter().collect(),
            Facet::Brand => self.brands.key.into_iter().collect(),
            Facet::Season => self.seasons.key.into_iter().collect(),
            Facet::Material => self.materials.key.into_iter().collect(),
            Facet::Sale => sent(SALE_KEYS),
            Facet::Rating => self.ratings.key.into_iter().collect(),
            Facet::InStock => sent(&["in_stock"]),
            Facet::IsNew => sent(&["is_new"]),
        }
    }

    /// Current query without the page parameter
    pub fn params_without_page(&self) -> QueryParams {
        let mut params = self.params.clone();
        params.remove(PAGE_KEY);
        params
    }
}

/// Facets actually applied, with their cleaned values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sale: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ratings: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_new: bool,
    pub sort: SortKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_blank_and_malformed_values_are_dropped() {
        let req = FilterRequest::from_pairs(&pairs(&[
            ("q", "   "),
            ("price_min", "abc"),
            ("price_max", "25.50"),
            ("category", "x"),
            ("category", "-3"),
            ("category", "0"),
            ("size", " "),
        ]));
        assert_eq!(req.q, None);
        assert_eq!(req.price_min, None);
        assert_eq!(req.price_max, Some((Decimal::new(2550, 2), "25.50".into())));
        assert!(!req.categories.is_active());
        assert_eq!(req.categories.key, Some("category"));
        assert!(!req.sizes.is_active());
    }

    #[test]
    fn test_first_alias_wins() {
        let req = FilterRequest::from_pairs(&pairs(&[
            ("colors[]", "Red"),
            ("color", "Blue"),
            ("color", " Blue "),
            ("brands", "Acme"),
        ]));
        assert_eq!(req.colors.values, vec!["Blue".to_string()]);
        assert_eq!(req.colors.key, Some("color"));
        assert_eq!(req.brands.key, Some("brands"));
    }

    #[test]
    fn test_sale_literals() {
        for v in ["true", "1", "True", "TRUE", " true "] {
            assert!(FilterRequest::from_pairs(&pairs(&[("sale", v)])).sale, "{v}");
        }
        for v in ["yes", "on", "tRue", "0"] {
            assert!(!FilterRequest::from_pairs(&pairs(&[("sale", v)])).sale, "{v}");
        }
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortKey::parse(None), SortKey::Popularity);
        assert_eq!(SortKey::parse(Some("price_desc")), SortKey::PriceDesc);
        assert_eq!(SortKey::parse(Some("cheapest")), SortKey::Date);
        assert_eq!(SortKey::parse(Some("")), SortKey::Date);
    }

    #[test]
    fn test_shop_extras() {
        let req = FilterRequest::from_pairs(&pairs(&[
            ("rating[]", "4"),
            ("rating[]", "9"),
            ("rating[]", "x"),
            ("in_stock", "false"),
            ("is_new", "true"),
            ("min_price", "5"),
            ("per_page", "500"),
        ]));
        assert_eq!(req.ratings.values, vec![4]);
        assert_eq!(req.in_stock, Some(false));
        assert!(req.is_new);
        assert_eq!(req.price_min.map(|(d, _)| d), Some(Decimal::from(5)));
        assert_eq!(req.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_query_string_encoding() {
        let params = QueryParams::new(pairs(&[("q", "red shoes"), ("sizes[]", "M")]));
        assert_eq!(params.to_query_string(), "q=red%20shoes&sizes%5B%5D=M");
        assert_eq!(QueryParams::default().url("/shop/"), "/shop/");
    }

    #[test]
    fn test_price_scientific_notation() {
        assert_eq!(parse_price("1e2"), Some(Decimal::from(100)));
        assert_eq!(parse_price("NaN"), None);
    }
}
