//! Order tracker lookup

use crate::db::repository::{order, product};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::TrackingInfo;
use sqlx::SqlitePool;

/// Find an order item by its public item id or its carrier tracking id
pub async fn track(pool: &SqlitePool, code: &str) -> AppResult<TrackingInfo> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::required("tracking code"));
    }
    let item = order::find_item_by_code(pool, code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound).with_detail("code", code))?;
    let parent = order::find_by_id(pool, &item.order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", item.order_id.as_str()))?;
    let product_name = product::find_by_id(pool, item.product_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_default();

    Ok(TrackingInfo {
        item,
        product_name,
        payment_status: parent.payment_status,
    })
}
