//! Notification Repository

use super::RepoResult;
use shared::models::Notification;
use sqlx::SqlitePool;

const NOTIFICATION_SELECT: &str = "SELECT id, user_id, vendor_id, order_id, kind, seen, created_at FROM notification";

pub async fn create(
    pool: &SqlitePool,
    user_id: Option<i64>,
    vendor_id: Option<i64>,
    order_id: &str,
    kind: &str,
) -> RepoResult<Notification> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO notification (id, user_id, vendor_id, order_id, kind, seen, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)")
        .bind(id)
        .bind(user_id)
        .bind(vendor_id)
        .bind(order_id)
        .bind(kind)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(Notification {
        id,
        user_id,
        vendor_id,
        order_id: Some(order_id.to_string()),
        kind: kind.to_string(),
        seen: false,
        created_at: now,
    })
}

/// Customer-facing notifications, newest first
pub async fn list_for_customer(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!("{NOTIFICATION_SELECT} WHERE user_id = ? AND vendor_id IS NULL ORDER BY created_at DESC, id DESC");
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_for_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<Notification>> {
    let sql = format!("{NOTIFICATION_SELECT} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
