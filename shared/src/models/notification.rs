//! Notification Model

use serde::{Deserialize, Serialize};

/// In-app notification for a customer or a vendor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub user_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub order_id: Option<String>,
    pub kind: String,
    pub seen: bool,
    pub created_at: i64,
}

pub const NOTIFICATION_NEW_ORDER: &str = "New Order";
