//! Order Repository
//!
//! Orders are written once at checkout; afterwards only payment fields and
//! coupon discounts change.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, PaymentMethod, PaymentStatus};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT order_id, customer_id, address_id, cart_id, sub_total, shipping, tax, service_fee, total, initial_total, saved, payment_status, payment_method, payment_id, order_status, created_at FROM orders";

pub(super) const ITEM_SELECT: &str = "SELECT id, item_id, order_id, product_id, vendor_id, qty, color, size, price, sub_total, shipping, tax, total, initial_total, saved, applied_coupon, order_status, shipping_service, tracking_id, created_at FROM order_item";

pub async fn find_by_id(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE order_id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{ITEM_SELECT} WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn vendor_ids(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT vendor_id FROM order_vendor WHERE order_id = ? ORDER BY vendor_id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Write the order header, its items and vendor links in one transaction
pub async fn insert(
    pool: &SqlitePool,
    order: &Order,
    items: &[OrderItem],
    vendor_ids: &[i64],
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (order_id, customer_id, address_id, cart_id, sub_total, shipping, tax, service_fee, total, initial_total, saved, payment_status, payment_method, payment_id, order_status, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    )
    .bind(&order.order_id)
    .bind(order.customer_id)
    .bind(order.address_id)
    .bind(&order.cart_id)
    .bind(order.sub_total)
    .bind(order.shipping)
    .bind(order.tax)
    .bind(order.service_fee)
    .bind(order.total)
    .bind(order.initial_total)
    .bind(order.saved)
    .bind(order.payment_status)
    .bind(order.payment_method)
    .bind(&order.payment_id)
    .bind(order.order_status)
    .bind(order.created_at)
    .execute(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_item (id, item_id, order_id, product_id, vendor_id, qty, color, size, price, sub_total, shipping, tax, total, initial_total, saved, applied_coupon, order_status, shipping_service, tracking_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        )
        .bind(item.id)
        .bind(&item.item_id)
        .bind(&order.order_id)
        .bind(item.product_id)
        .bind(item.vendor_id)
        .bind(item.qty)
        .bind(&item.color)
        .bind(&item.size)
        .bind(item.price)
        .bind(item.sub_total)
        .bind(item.shipping)
        .bind(item.tax)
        .bind(item.total)
        .bind(item.initial_total)
        .bind(item.saved)
        .bind(item.applied_coupon)
        .bind(item.order_status)
        .bind(item.shipping_service)
        .bind(&item.tracking_id)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for vendor_id in vendor_ids {
        sqlx::query("INSERT OR IGNORE INTO order_vendor (order_id, vendor_id) VALUES (?, ?)")
            .bind(&order.order_id)
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Processing → Paid, guarded by the current status and the started payment
///
/// `reference` is the reference the payment was started with; a coupon
/// applied since then cleared it, so a stale confirmation changes nothing.
/// Returns true only for the call that performed the transition; concurrent
/// or repeated confirmations see zero affected rows.
pub async fn mark_paid(
    pool: &SqlitePool,
    order_id: &str,
    method: PaymentMethod,
    reference: &str,
    payment_id: Option<&str>,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = ?1, payment_method = ?2, payment_id = COALESCE(?3, payment_id) \
         WHERE order_id = ?4 AND payment_status = ?5 AND payment_method = ?2 AND payment_id = ?6",
    )
    .bind(PaymentStatus::Paid)
    .bind(method)
    .bind(payment_id)
    .bind(order_id)
    .bind(PaymentStatus::Processing)
    .bind(reference)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Remember the gateway-side reference of a started payment
pub async fn set_payment_reference(
    pool: &SqlitePool,
    order_id: &str,
    method: PaymentMethod,
    payment_id: &str,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_method = ?, payment_id = ? WHERE order_id = ? AND payment_status = ?",
    )
    .bind(method)
    .bind(payment_id)
    .bind(order_id)
    .bind(PaymentStatus::Processing)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Processing order {order_id}")));
    }
    Ok(())
}

/// Order item by its public `item_id` or its carrier `tracking_id`
pub async fn find_item_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<OrderItem>> {
    let sql = format!("{ITEM_SELECT} WHERE item_id = ?1 OR tracking_id = ?1 ORDER BY id LIMIT 1");
    let row = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use shared::models::OrderStatus;

    fn sample_order(order_id: &str) -> Order {
        Order {
            order_id: order_id.to_string(),
            customer_id: Some(1),
            address_id: None,
            cart_id: Some("tok".into()),
            sub_total: 20.0,
            shipping: 2.0,
            tax: 0.0,
            service_fee: 0.0,
            total: 22.0,
            initial_total: 22.0,
            saved: 0.0,
            payment_status: PaymentStatus::Processing,
            payment_method: None,
            payment_id: None,
            order_status: OrderStatus::Pending,
            created_at: 1,
        }
    }

    fn sample_item(order_id: &str, product_id: i64, vendor_id: i64) -> OrderItem {
        OrderItem {
            id: shared::util::snowflake_id(),
            item_id: shared::util::short_code(10),
            order_id: order_id.to_string(),
            product_id,
            vendor_id: Some(vendor_id),
            qty: 2,
            color: None,
            size: Some("M".into()),
            price: 10.0,
            sub_total: 20.0,
            shipping: 2.0,
            tax: 0.0,
            total: 22.0,
            initial_total: 22.0,
            saved: 0.0,
            applied_coupon: false,
            order_status: OrderStatus::Pending,
            shipping_service: None,
            tracking_id: Some("TRK-1".into()),
            created_at: 1,
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let pool = testing::pool().await;
        let vendor = testing::vendor(&pool, "Acme").await;
        let mut data = testing::product_data("Shirt", 10.0);
        data.vendor_id = Some(vendor);
        let product = testing::product(&pool, data).await;

        let order = sample_order("1000001");
        let item = sample_item("1000001", product, vendor);
        insert(&pool, &order, std::slice::from_ref(&item), &[vendor, vendor])
            .await
            .unwrap();

        assert_eq!(find_by_id(&pool, "1000001").await.unwrap(), Some(order));
        assert_eq!(find_items(&pool, "1000001").await.unwrap(), vec![item.clone()]);
        assert_eq!(vendor_ids(&pool, "1000001").await.unwrap(), vec![vendor]);

        let by_tracking = find_item_by_code(&pool, "TRK-1").await.unwrap().unwrap();
        assert_eq!(by_tracking.item_id, item.item_id);
        let by_code = find_item_by_code(&pool, &item.item_id).await.unwrap();
        assert!(by_code.is_some());
        assert!(find_item_by_code(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let pool = testing::pool().await;
        insert(&pool, &sample_order("42"), &[], &[]).await.unwrap();
        set_payment_reference(&pool, "42", PaymentMethod::Stripe, "cs_1").await.unwrap();

        assert!(mark_paid(&pool, "42", PaymentMethod::Stripe, "cs_1", Some("pi_1")).await.unwrap());
        assert!(!mark_paid(&pool, "42", PaymentMethod::Stripe, "cs_1", Some("pi_1")).await.unwrap());

        let order = find_by_id(&pool, "42").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.payment_method, Some(PaymentMethod::Stripe));
        assert_eq!(order.payment_id.as_deref(), Some("pi_1"));
    }

    #[tokio::test]
    async fn test_mark_paid_requires_started_reference() {
        let pool = testing::pool().await;
        insert(&pool, &sample_order("43"), &[], &[]).await.unwrap();
        assert!(!mark_paid(&pool, "43", PaymentMethod::Paystack, "R1", None).await.unwrap());

        set_payment_reference(&pool, "43", PaymentMethod::Paystack, "R2").await.unwrap();
        assert!(!mark_paid(&pool, "43", PaymentMethod::Paystack, "R1", None).await.unwrap());
        assert!(!mark_paid(&pool, "43", PaymentMethod::PayPal, "R2", None).await.unwrap());

        let order = find_by_id(&pool, "43").await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Processing);
        assert!(mark_paid(&pool, "43", PaymentMethod::Paystack, "R2", None).await.unwrap());
        let order = find_by_id(&pool, "43").await.unwrap().unwrap();
        assert_eq!(order.payment_id.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_duplicate_order_id() {
        let pool = testing::pool().await;
        insert(&pool, &sample_order("7"), &[], &[]).await.unwrap();
        let err = insert(&pool, &sample_order("7"), &[], &[]).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
