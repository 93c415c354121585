//! Product Variant / Option Repository

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
#[cfg(test)]
use shared::models::ProductVariantCreate;
use shared::models::{ProductOption, ProductVariant};
use sqlx::SqlitePool;

const VARIANT_SELECT: &str = "SELECT id, product_id, size, color, color_code, stock, is_available, price_modifier FROM product_variant";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductVariant>> {
    let sql = format!("{VARIANT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ProductVariant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Variants of every published product
pub async fn find_for_published(pool: &SqlitePool) -> RepoResult<Vec<ProductVariant>> {
    let rows = sqlx::query_as::<_, ProductVariant>(
        "SELECT v.id, v.product_id, v.size, v.color, v.color_code, v.stock, v.is_available, v.price_modifier FROM product_variant v JOIN product p ON p.id = v.product_id WHERE p.status = 'published' ORDER BY v.product_id, v.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Test seeding only; catalog rows are written by the back-office
#[cfg(test)]
pub async fn create(
    pool: &SqlitePool,
    product_id: i64,
    data: ProductVariantCreate,
) -> RepoResult<ProductVariant> {
    let id = shared::util::snowflake_id();
    let size = data.size.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let color = data.color.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    sqlx::query(
        "INSERT INTO product_variant (id, product_id, size, color, color_code, stock, is_available, price_modifier) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(product_id)
    .bind(size)
    .bind(color)
    .bind(data.color_code)
    .bind(data.stock.unwrap_or(0))
    .bind(data.is_available.unwrap_or(true))
    .bind(data.price_modifier.unwrap_or(0.0))
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create variant".into()))
}

/// Attach a descriptive option item ("Size"/"Color" group) to a product
///
/// Test seeding only; catalog rows are written by the back-office
#[cfg(test)]
pub async fn create_option(
    pool: &SqlitePool,
    product_id: i64,
    name: &str,
    title: Option<&str>,
    content: Option<&str>,
) -> RepoResult<ProductOption> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO product_option (id, product_id, name, title, content) VALUES (?1, ?2, ?3, ?4, ?5)")
        .bind(id)
        .bind(product_id)
        .bind(name)
        .bind(title)
        .bind(content)
        .execute(pool)
        .await?;
    Ok(ProductOption {
        id,
        product_id,
        name: name.to_string(),
        title: title.map(str::to_string),
        content: content.map(str::to_string),
    })
}

/// Option items of every published product
pub async fn find_options_for_published(pool: &SqlitePool) -> RepoResult<Vec<ProductOption>> {
    let rows = sqlx::query_as::<_, ProductOption>(
        "SELECT o.id, o.product_id, o.name, o.title, o.content FROM product_option o JOIN product p ON p.id = o.product_id WHERE p.status = 'published' ORDER BY o.product_id, o.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
