//! Coupon Model

use serde::{Deserialize, Serialize};

/// Vendor-scoped percentage discount
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub vendor_id: Option<i64>,
    pub code: String,
    /// Whole percent, e.g. 10 = 10%
    pub discount: i64,
}
