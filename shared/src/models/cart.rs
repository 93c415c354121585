//! Cart Models

use serde::{Deserialize, Serialize};

/// One line of a shopper's cart
///
/// At most one line exists per `(cart_id, product_id)`. `price` is the unit
/// price snapshot taken on the last add/update of this product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub cart_id: String,
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub qty: i64,
    pub price: f64,
    pub sub_total: f64,
    pub shipping: f64,
    pub total: f64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Cart line joined with what the shopper needs to see
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLineView {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub vendor_id: Option<i64>,
    pub qty: i64,
    pub price: f64,
    pub sub_total: f64,
    pub shipping: f64,
    pub total: f64,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Add/update request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineUpsert {
    pub product_id: i64,
    pub qty: i64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Whole cart as returned to the shopper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    pub items: Vec<CartLineView>,
    pub item_count: usize,
    pub sub_total: f64,
    pub shipping: f64,
    pub total: f64,
    /// Callers redirect instead of rendering when true
    pub is_empty: bool,
}

/// Result of an add/update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartUpdateResult {
    pub message: String,
    pub line: CartLine,
    pub total_cart_items: i64,
    pub cart_sub_total: f64,
    pub item_sub_total: f64,
}
