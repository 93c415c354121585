//! Cart Aggregator
//!
//! A cart is the set of `cart_line` rows sharing an opaque token. Adding a
//! product that is already in the cart overwrites its line: quantity,
//! selection and unit price are replaced, never accumulated. Concurrent adds
//! of the same product race and the last write wins.

use crate::db::repository::{cart, product};
use crate::pricing::{sum, to_decimal, to_f64};
use crate::utils::{AppError, AppResult, ErrorCode};
use rust_decimal::Decimal;
use shared::models::{CartLineUpsert, CartSummary, CartUpdateResult, CartLineView};
use sqlx::SqlitePool;

pub const MSG_ADDED: &str = "Added to cart";
pub const MSG_UPDATED: &str = "Cart updated";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require_token(cart_id: &str) -> AppResult<&str> {
    let token = cart_id.trim();
    if token.is_empty() {
        return Err(AppError::required("cart token"));
    }
    Ok(token)
}

/// Totals over a set of lines; zero for an empty cart
pub fn summarize(items: Vec<CartLineView>) -> CartSummary {
    let sub_total = sum(items.iter().map(|l| l.sub_total));
    let shipping = sum(items.iter().map(|l| l.shipping));
    let total = sum(items.iter().map(|l| l.total));
    CartSummary {
        item_count: items.len(),
        is_empty: items.is_empty(),
        sub_total: to_f64(sub_total),
        shipping: to_f64(shipping),
        total: to_f64(total),
        items,
    }
}

#[derive(Debug, Clone)]
pub struct CartService {
    pool: SqlitePool,
}

impl CartService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product or overwrite its existing line
    ///
    /// The unit price is re-read from the product on every call.
    pub async fn add_or_update(
        &self,
        cart_id: &str,
        customer_id: Option<i64>,
        req: CartLineUpsert,
    ) -> AppResult<CartUpdateResult> {
        let cart_id = require_token(cart_id)?;
        if req.qty < 1 {
            return Err(AppError::new(ErrorCode::InvalidQuantity).with_detail("qty", req.qty));
        }

        let item = product::find_by_id(&self.pool, req.product_id)
            .await?
            .filter(|p| p.is_published())
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", req.product_id)
            })?;
        if req.qty > item.stock {
            return Err(AppError::with_message(
                ErrorCode::QuantityExceedsStock,
                format!("Only {} of {} in stock", item.stock, item.name),
            )
            .with_detail("stock", item.stock)
            .with_detail("qty", req.qty));
        }

        let existed = cart::find_line(&self.pool, cart_id, item.id).await?.is_some();

        let qty = Decimal::from(req.qty);
        let sub_total = to_decimal(item.price) * qty;
        let shipping = to_decimal(item.shipping) * qty;
        let line = cart::upsert_line(
            &self.pool,
            cart::LineWrite {
                cart_id,
                product_id: item.id,
                user_id: customer_id,
                qty: req.qty,
                price: item.price,
                sub_total: to_f64(sub_total),
                shipping: to_f64(shipping),
                total: to_f64(sub_total + shipping),
                size: non_empty(req.size.as_deref()),
                color: non_empty(req.color.as_deref()),
            },
        )
        .await?;

        tracing::debug!(cart_id = %cart_id, product_id = item.id, qty = req.qty, updated = existed, "Cart line written");

        let lines = cart::find_lines(&self.pool, cart_id).await?;
        Ok(CartUpdateResult {
            message: if existed { MSG_UPDATED } else { MSG_ADDED }.to_string(),
            total_cart_items: lines.len() as i64,
            cart_sub_total: to_f64(sum(lines.iter().map(|l| l.sub_total))),
            item_sub_total: line.sub_total,
            line,
        })
    }

    /// Delete one line of this cart and return what is left
    pub async fn remove(&self, cart_id: &str, line_id: i64) -> AppResult<CartSummary> {
        let cart_id = require_token(cart_id)?;
        if !cart::delete_line(&self.pool, cart_id, line_id).await? {
            return Err(AppError::new(ErrorCode::CartLineNotFound).with_detail("line_id", line_id));
        }
        self.list(cart_id).await
    }

    /// Lines with totals. An unknown or empty token is an empty cart.
    pub async fn list(&self, cart_id: &str) -> AppResult<CartSummary> {
        let token = cart_id.trim();
        if token.is_empty() {
            return Ok(summarize(Vec::new()));
        }
        Ok(summarize(cart::list_views(&self.pool, token).await?))
    }

    /// Number of lines
    pub async fn count(&self, cart_id: &str) -> AppResult<i64> {
        let token = cart_id.trim();
        if token.is_empty() {
            return Ok(0);
        }
        Ok(cart::count(&self.pool, token).await?)
    }

    /// Sum of line sub-totals
    pub async fn sub_total(&self, cart_id: &str) -> AppResult<f64> {
        let lines = cart::find_lines(&self.pool, cart_id.trim()).await?;
        Ok(to_f64(sum(lines.iter().map(|l| l.sub_total))))
    }

    /// Hand every line of the token over to a signed-in customer
    pub async fn transfer(&self, cart_id: &str, customer_id: i64) -> AppResult<u64> {
        let cart_id = require_token(cart_id)?;
        let moved = cart::assign_owner(&self.pool, cart_id, customer_id).await?;
        if moved > 0 {
            tracing::debug!(cart_id = %cart_id, customer_id, lines = moved, "Cart lines re-owned");
        }
        Ok(moved)
    }

    /// Drop the cart (and any line the customer still owns elsewhere)
    pub async fn clear(&self, cart_id: &str, customer_id: Option<i64>) -> AppResult<u64> {
        Ok(cart::clear(&self.pool, cart_id.trim(), customer_id).await?)
    }
}
