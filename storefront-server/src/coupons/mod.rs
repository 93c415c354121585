//! Coupon Engine
//!
//! A coupon takes `discount` percent off every item of the coupon's vendor
//! in an order, at most once per item. The coupon is recorded on the order
//! only when at least one item qualified; a coupon whose vendor has no items
//! in the order changes nothing and is not recorded.
//!
//! Applications to the same order are serialized by a per-order async lock
//! and run in one transaction. The order update is conditional on the order
//! still being `Processing`, so a payment confirmed mid-application rolls the
//! whole application back.

use crate::db::repository::{RepoError, coupon, order};
use crate::pricing::{percent_of, round_money, to_decimal, to_f64};
use crate::utils::{AppError, AppResult, ErrorCode};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::Order;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Applied,
    /// Coupon was already on the order; nothing changed
    AlreadyApplied,
    /// No item of the coupon's vendor was eligible; nothing changed
    NoMatchingItems,
}

#[derive(Debug, Clone, Serialize)]
pub struct CouponOutcome {
    pub order: Order,
    /// Amount taken off by this application
    pub discount: f64,
    pub status: CouponStatus,
}

#[derive(Debug, Clone)]
pub struct CouponService {
    pool: SqlitePool,
    /// One async mutex per order currently being discounted
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CouponService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(DashMap::new()),
        }
    }

    fn order_lock(&self, order_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn release(&self, order_id: &str) {
        self.locks
            .remove_if(order_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Apply `code` to the order
    pub async fn apply(&self, order_id: &str, code: Option<&str>) -> AppResult<CouponOutcome> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::new(ErrorCode::CouponCodeRequired))?;

        let lock = self.order_lock(order_id);
        let result = {
            let _guard = lock.lock().await;
            self.apply_locked(order_id, code).await
        };
        drop(lock);
        self.release(order_id);
        result
    }

    async fn apply_locked(&self, order_id: &str, code: &str) -> AppResult<CouponOutcome> {
        let pool = &self.pool;
        let mut current = order::find_by_id(pool, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))?;
        if current.is_paid() {
            return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order_id));
        }
        let found = coupon::find_by_code(pool, code)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CouponNotFound).with_detail("code", code))?;

        let mut tx = pool.begin().await.map_err(RepoError::from)?;

        if coupon::order_has_coupon(&mut tx, order_id, found.id).await? {
            tracing::info!(order_id = %order_id, code = %code, "Coupon already applied");
            return Ok(CouponOutcome {
                order: current,
                discount: 0.0,
                status: CouponStatus::AlreadyApplied,
            });
        }

        let percent = Decimal::from(found.discount);
        let mut total_discount = Decimal::ZERO;
        for mut item in coupon::eligible_items(&mut tx, order_id, found.vendor_id, found.id).await? {
            let item_total = to_decimal(item.total);
            let discount = round_money(percent_of(item_total, percent));
            item.total = to_f64(item_total - discount);
            item.saved = to_f64(to_decimal(item.saved) + discount);
            item.applied_coupon = true;
            coupon::apply_to_item(&mut tx, &item, found.id).await?;
            total_discount += discount;
        }

        let status = if total_discount > Decimal::ZERO {
            current.total = to_f64(to_decimal(current.total) - total_discount);
            current.sub_total = to_f64(to_decimal(current.sub_total) - total_discount);
            current.saved = to_f64(to_decimal(current.saved) + total_discount);
            if !coupon::apply_to_order(&mut tx, &current, found.id).await? {
                tx.rollback().await.map_err(RepoError::from)?;
                tracing::warn!(order_id = %order_id, code = %code, "Order paid while applying coupon");
                return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order_id));
            }
            current.payment_method = None;
            current.payment_id = None;
            CouponStatus::Applied
        } else {
            CouponStatus::NoMatchingItems
        };

        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            order_id = %order_id,
            code = %code,
            discount = %total_discount,
            status = ?status,
            "Coupon processed"
        );
        Ok(CouponOutcome {
            order: current,
            discount: to_f64(total_discount),
            status,
        })
    }
}
