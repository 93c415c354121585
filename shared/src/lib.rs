//! Shared types for the storefront
//!
//! Common types used by the server crate and API clients including
//! error codes, response envelopes, domain models and small utilities.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use types::Lookup;
