//! Data models
//!
//! Shared between the storefront server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Row ids are `i64` (SQLite INTEGER PRIMARY KEY); orders are keyed by their
//! public `order_id` string.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod notification;
pub mod order;

// Re-exports
pub use address::*;
pub use cart::*;
pub use catalog::*;
pub use coupon::*;
pub use notification::*;
pub use order::*;
