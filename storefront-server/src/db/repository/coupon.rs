//! Coupon Repository
//!
//! Attachment tables have composite primary keys, so a coupon lands at most
//! once per order and at most once per order item. Writes used by coupon
//! application take the caller's transaction.

#[cfg(test)]
use super::RepoError;
use super::RepoResult;
use super::order::ITEM_SELECT;
use shared::models::{Coupon, Order, OrderItem, PaymentStatus};
use sqlx::{Sqlite, SqlitePool, Transaction};

type Tx<'a> = Transaction<'a, Sqlite>;

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Coupon>> {
    let row = sqlx::query_as::<_, Coupon>("SELECT id, vendor_id, code, discount FROM coupon WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Test seeding only; coupons are issued by the back-office
#[cfg(test)]
pub async fn create(
    pool: &SqlitePool,
    vendor_id: Option<i64>,
    code: &str,
    discount: i64,
) -> RepoResult<Coupon> {
    if !(0..=100).contains(&discount) {
        return Err(RepoError::Validation(format!("discount {discount}% is outside 0-100")));
    }
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO coupon (id, vendor_id, code, discount) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(vendor_id)
        .bind(code.trim())
        .bind(discount)
        .execute(pool)
        .await?;
    Ok(Coupon {
        id,
        vendor_id,
        code: code.trim().to_string(),
        discount,
    })
}

/// Coupons recorded on an order
pub async fn find_for_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<Coupon>> {
    let rows = sqlx::query_as::<_, Coupon>(
        "SELECT c.id, c.vendor_id, c.code, c.discount FROM coupon c JOIN order_coupon oc ON oc.coupon_id = c.id WHERE oc.order_id = ? ORDER BY c.code",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Coupon ids applied to a single order item
pub async fn find_for_item(pool: &SqlitePool, order_item_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT coupon_id FROM order_item_coupon WHERE order_item_id = ? ORDER BY coupon_id",
    )
    .bind(order_item_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn order_has_coupon(tx: &mut Tx<'_>, order_id: &str, coupon_id: i64) -> RepoResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT coupon_id FROM order_coupon WHERE order_id = ? AND coupon_id = ?",
    )
    .bind(order_id)
    .bind(coupon_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(found.is_some())
}

/// Order items of `vendor_id` that do not carry this coupon yet
pub async fn eligible_items(
    tx: &mut Tx<'_>,
    order_id: &str,
    vendor_id: Option<i64>,
    coupon_id: i64,
) -> RepoResult<Vec<OrderItem>> {
    let sql = format!(
        "{ITEM_SELECT} WHERE order_id = ?1 AND vendor_id IS ?2 \
         AND NOT EXISTS (SELECT 1 FROM order_item_coupon ic WHERE ic.order_item_id = order_item.id AND ic.coupon_id = ?3) \
         ORDER BY id"
    );
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .bind(vendor_id)
        .bind(coupon_id)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows)
}

/// Record the coupon on one item with its new total/saved
pub async fn apply_to_item(
    tx: &mut Tx<'_>,
    item: &OrderItem,
    coupon_id: i64,
) -> RepoResult<()> {
    sqlx::query("INSERT INTO order_item_coupon (order_item_id, coupon_id) VALUES (?, ?)")
        .bind(item.id)
        .bind(coupon_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("UPDATE order_item SET total = ?, saved = ?, applied_coupon = 1 WHERE id = ?")
        .bind(item.total)
        .bind(item.saved)
        .bind(item.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Record the coupon on the order with its new aggregates
///
/// Only a `Processing` order is written. A payment started for the old total
/// is dropped, so the shopper starts a new one for the discounted total.
/// Returns false when the order was paid in the meantime; the caller rolls
/// the transaction back.
pub async fn apply_to_order(tx: &mut Tx<'_>, order: &Order, coupon_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET total = ?, sub_total = ?, saved = ?, payment_method = NULL, payment_id = NULL \
         WHERE order_id = ? AND payment_status = ?",
    )
    .bind(order.total)
    .bind(order.sub_total)
    .bind(order.saved)
    .bind(&order.order_id)
    .bind(PaymentStatus::Processing)
    .execute(&mut **tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Ok(false);
    }
    sqlx::query("INSERT INTO order_coupon (order_id, coupon_id) VALUES (?, ?)")
        .bind(&order.order_id)
        .bind(coupon_id)
        .execute(&mut **tx)
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = testing::pool().await;
        let vendor = testing::vendor(&pool, "Acme").await;
        create(&pool, Some(vendor), " SAVE10 ", 10).await.unwrap();

        let coupon = find_by_code(&pool, "SAVE10").await.unwrap().unwrap();
        assert_eq!(coupon.discount, 10);
        assert_eq!(coupon.vendor_id, Some(vendor));
        assert!(find_by_code(&pool, "save10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_paid_before_commit_is_not_rewritten() {
        use shared::models::{OrderStatus, PaymentMethod};
        use super::super::order;

        let pool = testing::pool().await;
        let coupon = create(&pool, None, "LATE", 10).await.unwrap();
        let placed = Order {
            order_id: "60000001".into(),
            customer_id: Some(1),
            address_id: None,
            cart_id: None,
            sub_total: 100.0,
            shipping: 0.0,
            tax: 0.0,
            service_fee: 0.0,
            total: 100.0,
            initial_total: 100.0,
            saved: 0.0,
            payment_status: PaymentStatus::Processing,
            payment_method: None,
            payment_id: None,
            order_status: OrderStatus::Pending,
            created_at: 1,
        };
        order::insert(&pool, &placed, &[], &[]).await.unwrap();
        order::set_payment_reference(&pool, "60000001", PaymentMethod::Paystack, "R1").await.unwrap();

        // the coupon engine read the order as Processing, then the payment landed
        let mut discounted = placed.clone();
        discounted.total = 90.0;
        discounted.sub_total = 90.0;
        discounted.saved = 10.0;
        assert!(order::mark_paid(&pool, "60000001", PaymentMethod::Paystack, "R1", None).await.unwrap());

        let mut tx = pool.begin().await.unwrap();
        assert!(!apply_to_order(&mut tx, &discounted, coupon.id).await.unwrap());
        tx.rollback().await.unwrap();

        let stored = order::find_by_id(&pool, "60000001").await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.total, 100.0);
        assert_eq!(stored.saved, 0.0);
        assert_eq!(stored.payment_id.as_deref(), Some("R1"));
        assert!(find_for_order(&pool, "60000001").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discount_drops_started_payment() {
        use shared::models::{OrderStatus, PaymentMethod};
        use super::super::order;

        let pool = testing::pool().await;
        let coupon = create(&pool, None, "EARLY", 10).await.unwrap();
        let mut placed = Order {
            order_id: "60000002".into(),
            customer_id: Some(1),
            address_id: None,
            cart_id: None,
            sub_total: 100.0,
            shipping: 0.0,
            tax: 0.0,
            service_fee: 0.0,
            total: 100.0,
            initial_total: 100.0,
            saved: 0.0,
            payment_status: PaymentStatus::Processing,
            payment_method: None,
            payment_id: None,
            order_status: OrderStatus::Pending,
            created_at: 1,
        };
        order::insert(&pool, &placed, &[], &[]).await.unwrap();
        order::set_payment_reference(&pool, "60000002", PaymentMethod::Paystack, "R1").await.unwrap();

        placed.total = 90.0;
        let mut tx = pool.begin().await.unwrap();
        assert!(apply_to_order(&mut tx, &placed, coupon.id).await.unwrap());
        tx.commit().await.unwrap();

        let stored = order::find_by_id(&pool, "60000002").await.unwrap().unwrap();
        assert_eq!(stored.total, 90.0);
        assert_eq!(stored.payment_method, None);
        assert_eq!(stored.payment_id, None);
        // a confirmation for the old total no longer lands
        assert!(!order::mark_paid(&pool, "60000002", PaymentMethod::Paystack, "R1", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_discount_bounds() {
        let pool = testing::pool().await;
        let err = create(&pool, None, "TOO-MUCH", 150).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
