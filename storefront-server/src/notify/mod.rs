//! Order notifications
//!
//! - [`mail`] - the [`Mailer`] seam with log and relay implementations
//!
//! [`NotificationService::order_paid`] writes the in-app rows for the buyer
//! and every vendor of an order, then sends the confirmation mails. Mail is
//! best-effort; a failed send is logged and never undoes anything.

pub mod mail;

pub use mail::{LogMailer, Mail, Mailer, RelayMailer};

use crate::db::repository::{address, notification, order, product, vendor};
use crate::utils::AppResult;
use futures::future::join_all;
use shared::models::{NOTIFICATION_NEW_ORDER, Notification, Order, OrderItem, Vendor};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

pub const NEW_ORDER_SUBJECT: &str = "New Order!";

#[derive(Clone)]
pub struct NotificationService {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("from", &self.from)
            .finish()
    }
}

fn item_line(item: &OrderItem, names: &HashMap<i64, String>) -> String {
    let name = names
        .get(&item.product_id)
        .map(String::as_str)
        .unwrap_or("Item");
    let mut line = format!("{} x {}", item.qty, name);
    if let Some(size) = &item.size {
        line.push_str(&format!(" / {size}"));
    }
    if let Some(color) = &item.color {
        line.push_str(&format!(" / {color}"));
    }
    format!("{line}  {:.2}  (ref {})", item.total, item.item_id)
}

fn buyer_body(order: &Order, items: &[OrderItem], names: &HashMap<i64, String>) -> String {
    let mut body = format!("Thank you for your order #{}.\n\n", order.order_id);
    for item in items {
        body.push_str(&item_line(item, names));
        body.push('\n');
    }
    body.push_str(&format!(
        "\nSub total: {:.2}\nShipping: {:.2}\nTax: {:.2}\nService fee: {:.2}\nTotal: {:.2}\n",
        order.sub_total, order.shipping, order.tax, order.service_fee, order.total
    ));
    if order.saved > 0.0 {
        body.push_str(&format!("You saved: {:.2}\n", order.saved));
    }
    body
}

fn vendor_body(order: &Order, vendor: &Vendor, items: &[&OrderItem], names: &HashMap<i64, String>) -> String {
    let mut body = format!(
        "Hello {},\n\nYou have a new order #{}:\n\n",
        vendor.name, order.order_id
    );
    for item in items {
        body.push_str(&item_line(item, names));
        body.push('\n');
    }
    body
}

impl NotificationService {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            pool,
            mailer,
            from: from.into(),
        }
    }

    /// Notify the buyer and every vendor that `order` has been paid
    ///
    /// Returns the rows written. Must run once per order; the caller
    /// guarantees that by only calling it for the confirmation that moved the
    /// order to Paid.
    pub async fn order_paid(&self, order: &Order) -> AppResult<Vec<Notification>> {
        let pool = &self.pool;
        let vendors = vendor::find_by_order(pool, &order.order_id).await?;
        let items = order::find_items(pool, &order.order_id).await?;

        let mut rows = Vec::with_capacity(vendors.len() + 1);
        if let Some(customer_id) = order.customer_id {
            rows.push(
                notification::create(pool, Some(customer_id), None, &order.order_id, NOTIFICATION_NEW_ORDER)
                    .await?,
            );
        }
        for v in &vendors {
            rows.push(
                notification::create(pool, None, Some(v.id), &order.order_id, NOTIFICATION_NEW_ORDER)
                    .await?,
            );
        }

        let mut names = HashMap::new();
        for item in &items {
            if names.contains_key(&item.product_id) {
                continue;
            }
            if let Some(p) = product::find_by_id(pool, item.product_id).await? {
                names.insert(p.id, p.name);
            }
        }

        let mut mails = Vec::new();
        let buyer_email = match order.address_id {
            Some(id) => address::find_by_id(pool, id).await?.and_then(|a| a.email),
            None => None,
        };
        match buyer_email {
            Some(to) => mails.push(Mail {
                from: self.from.clone(),
                to,
                subject: NEW_ORDER_SUBJECT.to_string(),
                body: buyer_body(order, &items, &names),
            }),
            None => tracing::debug!(order_id = %order.order_id, "No buyer email on file"),
        }
        for v in &vendors {
            let Some(to) = v.email.clone() else {
                continue;
            };
            let own: Vec<&OrderItem> = items.iter().filter(|i| i.vendor_id == Some(v.id)).collect();
            mails.push(Mail {
                from: self.from.clone(),
                to,
                subject: NEW_ORDER_SUBJECT.to_string(),
                body: vendor_body(order, v, &own, &names),
            });
        }
        self.deliver(&mails).await;

        tracing::info!(
            order_id = %order.order_id,
            notifications = rows.len(),
            mails = mails.len(),
            "Order notifications sent"
        );
        Ok(rows)
    }

    /// Send all mails concurrently; returns how many went out
    pub async fn deliver(&self, mails: &[Mail]) -> usize {
        let results = join_all(mails.iter().map(|m| self.mailer.send(m))).await;
        let mut delivered = 0;
        for (mail, result) in mails.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(to = %mail.to, error = %e, "Mail delivery failed"),
            }
        }
        delivered
    }

    /// Customer notifications, newest first
    pub async fn list_for_customer(&self, customer_id: i64) -> AppResult<Vec<Notification>> {
        Ok(notification::list_for_customer(&self.pool, customer_id).await?)
    }
}
