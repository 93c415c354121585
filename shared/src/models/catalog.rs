//! Catalog Models

use serde::{Deserialize, Serialize};

/// Product visibility. Only `Published` products are visible to shoppers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ProductStatus {
    #[default]
    Published,
    Draft,
    Disabled,
}

/// Seller owning products, coupons and receiving order notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Product entity
///
/// `price < regular_price` marks the product as on sale. Money is stored as
/// `f64` rounded to cents; arithmetic happens in `rust_decimal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub vendor_id: Option<i64>,
    pub category_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub season: Option<String>,
    pub material: Option<String>,
    pub price: f64,
    pub regular_price: Option<f64>,
    /// Per-unit shipping charge
    pub shipping: f64,
    pub stock: i64,
    pub status: ProductStatus,
    pub featured: bool,
    pub is_new: bool,
    pub in_stock: bool,
    pub created_at: i64,
}

impl Product {
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    pub fn is_on_sale(&self) -> bool {
        self.regular_price.is_some_and(|regular| regular > self.price)
    }
}

/// Create product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    pub vendor_id: Option<i64>,
    pub category_id: Option<i64>,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub season: Option<String>,
    pub material: Option<String>,
    pub price: f64,
    pub regular_price: Option<f64>,
    pub shipping: Option<f64>,
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub featured: Option<bool>,
    pub is_new: Option<bool>,
    pub created_at: Option<i64>,
}

/// Concrete purchasable variant of a product (size/colour combination)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Hex colour code such as `#ff0000`
    pub color_code: Option<String>,
    pub stock: i64,
    pub is_available: bool,
    pub price_modifier: f64,
}

/// Create variant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductVariantCreate {
    pub size: Option<String>,
    pub color: Option<String>,
    pub color_code: Option<String>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
    pub price_modifier: Option<f64>,
}

/// Descriptive option item attached to a product, grouped by `name`
/// ("Size", "Color", ...). Feeds the facet option lists but never the
/// size/colour filters themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductOption {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ProductOption {
    /// Facet value: `content`, else `title`
    pub fn value(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.title.as_deref())
            .filter(|v| !v.is_empty())
    }
}

/// Product review
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub rating: i64,
    pub review: Option<String>,
    pub created_at: i64,
}

/// Aggregated review numbers per product
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReviewStats {
    pub product_id: i64,
    pub review_count: i64,
    pub avg_rating: Option<f64>,
    pub max_rating: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, regular: Option<f64>) -> Product {
        Product {
            id: 1,
            vendor_id: None,
            category_id: None,
            name: "Tee".into(),
            slug: "tee".into(),
            description: None,
            brand: None,
            season: None,
            material: None,
            price,
            regular_price: regular,
            shipping: 0.0,
            stock: 1,
            status: ProductStatus::Published,
            featured: false,
            is_new: false,
            in_stock: true,
            created_at: 0,
        }
    }

    #[test]
    fn test_on_sale_requires_strictly_higher_regular_price() {
        assert!(product(10.0, Some(12.0)).is_on_sale());
        assert!(!product(10.0, Some(10.0)).is_on_sale());
        assert!(!product(10.0, None).is_on_sale());
    }

    #[test]
    fn test_option_value_prefers_content() {
        let mut option = ProductOption {
            id: 1,
            product_id: 1,
            name: "Size".into(),
            title: Some("Medium".into()),
            content: Some("M".into()),
        };
        assert_eq!(option.value(), Some("M"));
        option.content = Some(String::new());
        assert_eq!(option.value(), Some("Medium"));
        option.title = None;
        assert_eq!(option.value(), None);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&ProductStatus::Draft).unwrap();
        assert_eq!(json, "\"draft\"");
    }
}
