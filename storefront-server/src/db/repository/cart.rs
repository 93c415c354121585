//! Cart Line Repository
//!
//! One row per `(cart_id, product_id)`; a repeated add overwrites the row.

use super::{RepoError, RepoResult};
use shared::models::{CartLine, CartLineView};
use sqlx::SqlitePool;

const LINE_SELECT: &str = "SELECT id, cart_id, product_id, user_id, qty, price, sub_total, shipping, total, size, color, created_at, updated_at FROM cart_line";

/// Values written by an add/update
#[derive(Debug, Clone)]
pub struct LineWrite<'a> {
    pub cart_id: &'a str,
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub qty: i64,
    pub price: f64,
    pub sub_total: f64,
    pub shipping: f64,
    pub total: f64,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
}

pub async fn find_line(
    pool: &SqlitePool,
    cart_id: &str,
    product_id: i64,
) -> RepoResult<Option<CartLine>> {
    let sql = format!("{LINE_SELECT} WHERE cart_id = ? AND product_id = ?");
    let row = sqlx::query_as::<_, CartLine>(&sql)
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_lines(pool: &SqlitePool, cart_id: &str) -> RepoResult<Vec<CartLine>> {
    let sql = format!("{LINE_SELECT} WHERE cart_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, CartLine>(&sql)
        .bind(cart_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert or overwrite the line for `(cart_id, product_id)`
///
/// Last write wins: quantity, selection and price snapshot are replaced, the
/// owner is only filled in when the write carries one.
pub async fn upsert_line(pool: &SqlitePool, line: LineWrite<'_>) -> RepoResult<CartLine> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO cart_line (id, cart_id, product_id, user_id, qty, price, sub_total, shipping, total, size, color, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12) \
         ON CONFLICT(cart_id, product_id) DO UPDATE SET \
           user_id = COALESCE(excluded.user_id, cart_line.user_id), qty = excluded.qty, price = excluded.price, \
           sub_total = excluded.sub_total, shipping = excluded.shipping, total = excluded.total, \
           size = excluded.size, color = excluded.color, updated_at = excluded.updated_at",
    )
    .bind(id)
    .bind(line.cart_id)
    .bind(line.product_id)
    .bind(line.user_id)
    .bind(line.qty)
    .bind(line.price)
    .bind(line.sub_total)
    .bind(line.shipping)
    .bind(line.total)
    .bind(line.size)
    .bind(line.color)
    .bind(now)
    .execute(pool)
    .await?;

    find_line(pool, line.cart_id, line.product_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to write cart line".into()))
}

/// Delete one line of this cart. Returns false when the cart has no such line.
pub async fn delete_line(pool: &SqlitePool, cart_id: &str, line_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM cart_line WHERE id = ? AND cart_id = ?")
        .bind(line_id)
        .bind(cart_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Lines joined with product name/slug/vendor for display
pub async fn list_views(pool: &SqlitePool, cart_id: &str) -> RepoResult<Vec<CartLineView>> {
    let rows = sqlx::query_as::<_, CartLineView>(
        "SELECT c.id, c.product_id, p.name AS product_name, p.slug AS product_slug, p.vendor_id, c.qty, c.price, c.sub_total, c.shipping, c.total, c.size, c.color \
         FROM cart_line c JOIN product p ON p.id = c.product_id WHERE c.cart_id = ? ORDER BY c.id",
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count(pool: &SqlitePool, cart_id: &str) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_line WHERE cart_id = ?")
        .bind(cart_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Re-own every line of the cart by `user_id`
pub async fn assign_owner(pool: &SqlitePool, cart_id: &str, user_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE cart_line SET user_id = ? WHERE cart_id = ? AND (user_id IS NULL OR user_id != ?)")
        .bind(user_id)
        .bind(cart_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

/// Remove every line of the cart, plus any line the customer still owns
pub async fn clear(pool: &SqlitePool, cart_id: &str, user_id: Option<i64>) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM cart_line WHERE cart_id = ?1 OR (?2 IS NOT NULL AND user_id = ?2)")
        .bind(cart_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
