//! Vendor Repository

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
use shared::models::Vendor;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Vendor>> {
    let row = sqlx::query_as::<_, Vendor>("SELECT id, name, email FROM vendor WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Vendors attached to an order (via order_vendor)
pub async fn find_by_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<Vendor>> {
    let rows = sqlx::query_as::<_, Vendor>(
        "SELECT v.id, v.name, v.email FROM vendor v JOIN order_vendor ov ON ov.vendor_id = v.id WHERE ov.order_id = ? ORDER BY v.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Test seeding only; catalog rows are written by the back-office
#[cfg(test)]
pub async fn create(pool: &SqlitePool, name: &str, email: Option<&str>) -> RepoResult<Vendor> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO vendor (id, name, email) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create vendor".into()))
}
