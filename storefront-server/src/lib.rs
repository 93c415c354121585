//! Storefront Server - multi-vendor shop backend
//!
//! # Overview
//!
//! - **Catalog** (`catalog`): faceted search over an in-memory snapshot of
//!   the published catalog, filter options, removable filter tags
//! - **Cart** (`cart`): one line per product per cart token
//! - **Checkout** (`checkout`): cart → order snapshot with tax and service fee
//! - **Coupons** (`coupons`): per-vendor percentage discounts on an order
//! - **Payments** (`payments`): gateway verification and the idempotent
//!   `Processing → Paid` transition
//! - **Locale** (`locale`): shopper country and display currency
//! - **HTTP API** (`api`): axum routes
//!
//! # Layout
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # config, state, server, errors
//! ├── db/            # SQLite pool and repositories
//! ├── catalog/       # facet resolver, options, tags, pagination
//! ├── cart/          # Cart Aggregator
//! ├── checkout/      # Order Finalizer, order tracker
//! ├── coupons/       # Coupon Engine
//! ├── payments/      # gateways and Payment Reconciler
//! ├── pricing/       # money helpers, tax table, service fee
//! ├── locale/        # geo lookup, exchange rates, price display
//! ├── notify/        # notifications and mail
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod core;
pub mod coupons;
pub mod db;
pub mod locale;
pub mod notify;
pub mod payments;
pub mod pricing;
pub mod utils;

// Re-export common types
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    let log_dir = config.log_dir();
    init_logger_with_file(&config.log_level, config.log_json, Some(&log_dir))?;
    Ok(config)
}
