//! Address Model

use serde::{Deserialize, Serialize};

/// Shipping address owned by a customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    /// ISO 3166-1 alpha-2 code, drives tax lookup
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
}

/// Create address payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressCreate {
    pub full_name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub country: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
}
