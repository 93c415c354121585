//! Order Finalizer
//!
//! Turns the current cart into an order. Every line is copied into an order
//! item, so later cart changes never reach the order. The cart itself stays
//! untouched until a payment is confirmed, which lets the shopper retry
//! checkout with the same cart.

mod tracking;

pub use tracking::track;

use crate::db::repository::{RepoError, address, cart, coupon, order};
use crate::pricing::{
    ServiceFee, TaxProvider, bounded_tax_rate, percent_of, round_money, sum, to_decimal, to_f64,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{
    CartLineView, Order, OrderDetail, OrderItem, OrderStatus, PaymentStatus,
};
use shared::util::{now_millis, short_code, snowflake_id};
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

pub const ORDER_ID_LEN: usize = 8;
pub const ITEM_ID_LEN: usize = 10;
/// Fresh public references to try when one collides
const MAX_ID_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    tax: Arc<dyn TaxProvider>,
    fee: ServiceFee,
    tax_timeout: Duration,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("fee", &self.fee)
            .field("tax_timeout", &self.tax_timeout)
            .finish()
    }
}

fn item_from_line(order_id: &str, line: &CartLineView, tax: Decimal, created_at: i64) -> OrderItem {
    OrderItem {
        id: snowflake_id(),
        item_id: short_code(ITEM_ID_LEN),
        order_id: order_id.to_string(),
        product_id: line.product_id,
        vendor_id: line.vendor_id,
        qty: line.qty,
        color: line.color.clone(),
        size: line.size.clone(),
        price: line.price,
        sub_total: line.sub_total,
        shipping: line.shipping,
        tax: to_f64(tax),
        total: line.total,
        initial_total: line.total,
        saved: 0.0,
        applied_coupon: false,
        order_status: OrderStatus::Pending,
        shipping_service: None,
        tracking_id: None,
        created_at,
    }
}

impl CheckoutService {
    pub fn new(
        pool: SqlitePool,
        tax: Arc<dyn TaxProvider>,
        fee: ServiceFee,
        tax_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            tax,
            fee,
            tax_timeout,
        }
    }

    /// Snapshot the cart into a new order
    ///
    /// `total = sub_total + shipping + tax + service_fee`, where the service
    /// fee is computed on the total before it.
    pub async fn place_order(
        &self,
        cart_id: &str,
        address_id: Option<i64>,
        customer_id: i64,
    ) -> AppResult<OrderDetail> {
        let address_id = address_id.ok_or_else(|| AppError::new(ErrorCode::AddressRequired))?;
        let address = address::find_by_id(&self.pool, address_id)
            .await?
            .filter(|a| a.user_id == customer_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::AddressNotOwned).with_detail("address", address_id)
            })?;

        let cart_id = cart_id.trim();
        let lines = if cart_id.is_empty() {
            Vec::new()
        } else {
            cart::list_views(&self.pool, cart_id).await?
        };
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::CartEmpty));
        }

        let rate = bounded_tax_rate(self.tax.as_ref(), &address.country, self.tax_timeout).await;
        if rate.is_degraded() {
            tracing::warn!(country = %address.country, "Tax provider degraded, default rate applied");
        }
        let rate = rate.into_value();

        let sub_total = sum(lines.iter().map(|l| l.sub_total));
        let shipping = sum(lines.iter().map(|l| l.shipping));
        let tax = round_money(percent_of(sub_total, rate));
        let before_fee = sub_total + shipping + tax;
        let service_fee = self.fee.fee(before_fee);
        let total = before_fee + service_fee;

        let vendor_ids: Vec<i64> = lines
            .iter()
            .filter_map(|l| l.vendor_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let created_at = now_millis();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let order_id = short_code(ORDER_ID_LEN);
            let header = Order {
                order_id: order_id.clone(),
                customer_id: Some(customer_id),
                address_id: Some(address.id),
                cart_id: Some(cart_id.to_string()),
                sub_total: to_f64(sub_total),
                shipping: to_f64(shipping),
                tax: to_f64(tax),
                service_fee: to_f64(service_fee),
                total: to_f64(total),
                initial_total: to_f64(total),
                saved: 0.0,
                payment_status: PaymentStatus::Processing,
                payment_method: None,
                payment_id: None,
                order_status: OrderStatus::Pending,
                created_at,
            };
            let items: Vec<OrderItem> = lines
                .iter()
                .map(|l| {
                    let item_tax = percent_of(to_decimal(l.sub_total), rate);
                    item_from_line(&order_id, l, item_tax, created_at)
                })
                .collect();

            match order::insert(&self.pool, &header, &items, &vendor_ids).await {
                Ok(()) => {
                    tracing::info!(
                        order_id = %order_id,
                        customer_id,
                        items = items.len(),
                        total = header.total,
                        "Order placed"
                    );
                    return Ok(OrderDetail {
                        order: header,
                        items,
                        vendor_ids,
                        coupons: Vec::new(),
                    });
                }
                Err(RepoError::Duplicate(msg)) if attempt < MAX_ID_ATTEMPTS => {
                    tracing::debug!(order_id = %order_id, error = %msg, "Public reference collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Order with items, vendors and recorded coupons
    pub async fn detail(&self, order_id: &str) -> AppResult<OrderDetail> {
        order_detail(&self.pool, order_id).await
    }
}

pub async fn order_detail(pool: &SqlitePool, order_id: &str) -> AppResult<OrderDetail> {
    let found = order::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?;
    Ok(OrderDetail {
        items: order::find_items(pool, order_id).await?,
        vendor_ids: order::vendor_ids(pool, order_id).await?,
        coupons: coupon::find_for_order(pool, order_id).await?,
        order: found,
    })
}
