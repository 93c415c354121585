//! Product Repository

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
#[cfg(test)]
use shared::models::ProductCreate;
use shared::models::{Product, ProductStatus};
use sqlx::SqlitePool;

const PRODUCT_SELECT: &str = "SELECT id, vendor_id, category_id, name, slug, description, brand, season, material, price, regular_price, shipping, stock, status, featured, is_new, in_stock, created_at FROM product";

/// Lowercase ASCII slug: alphanumerics kept, every other run becomes `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Every shopper-visible product, newest first
pub async fn find_published(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let sql = format!("{PRODUCT_SELECT} WHERE status = ? ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(ProductStatus::Published)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Test seeding only; catalog rows are written by the back-office
///
/// The slug defaults to the slugified name plus the id and
/// is never changed afterwards.
#[cfg(test)]
pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("name is required".into()));
    }
    if data.price < 0.0 || data.regular_price.is_some_and(|p| p < 0.0) {
        return Err(RepoError::Validation("price must not be negative".into()));
    }
    let stock = data.stock.unwrap_or(0);
    if stock < 0 {
        return Err(RepoError::Validation("stock must not be negative".into()));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let slug = data
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("{}-{}", slugify(&data.name), id));

    sqlx::query(
        "INSERT INTO product (id, vendor_id, category_id, name, slug, description, brand, season, material, price, regular_price, shipping, stock, status, featured, is_new, in_stock, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
    )
    .bind(id)
    .bind(data.vendor_id)
    .bind(data.category_id)
    .bind(data.name.trim())
    .bind(&slug)
    .bind(data.description)
    .bind(data.brand)
    .bind(data.season)
    .bind(data.material)
    .bind(data.price)
    .bind(data.regular_price)
    .bind(data.shipping.unwrap_or(0.0))
    .bind(stock)
    .bind(data.status.unwrap_or_default())
    .bind(data.featured.unwrap_or(false))
    .bind(data.is_new.unwrap_or(false))
    .bind(stock > 0)
    .bind(data.created_at.unwrap_or(now))
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}
