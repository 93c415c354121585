//! Payments
//!
//! # Structure
//!
//! - [`gateway`] - the [`PaymentGateway`] trait and the configured registry
//! - [`stripe`] - Checkout Sessions
//! - [`paypal`] - order lookup with a client-credentials token
//! - [`razorpay`] - HMAC-signed callback triple
//! - [`paystack`] - transaction lookup by reference
//! - [`flutterwave`] - transaction lookup by id
//! - [`reconciler`] - the idempotent `Processing → Paid` transition

pub mod flutterwave;
pub mod gateway;
pub mod paypal;
pub mod paystack;
pub mod razorpay;
pub mod reconciler;
pub mod stripe;

pub use flutterwave::FlutterwaveGateway;
pub use gateway::{GatewayRegistry, Payload, PaymentGateway, PaymentStart, PaymentVerdict};
pub use paypal::PayPalGateway;
pub use paystack::PaystackGateway;
pub use razorpay::RazorpayGateway;
pub use reconciler::{PaymentOutcome, PaymentResult, PaymentService, status_redirect};
pub use stripe::{StripeGateway, StripeSession};
