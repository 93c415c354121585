//! Gateway seam and registry

use super::{FlutterwaveGateway, PayPalGateway, PaystackGateway, RazorpayGateway, StripeGateway};
use crate::core::config::GatewayCredentials;
use crate::pricing::to_decimal;
use crate::utils::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use shared::models::{Order, PaymentMethod};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Gateway callback fields, as sent by the gateway redirect or the client
pub type Payload = HashMap<String, String>;

/// What a gateway said about one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentVerdict {
    pub order_id: String,
    pub paid: bool,
    pub method: PaymentMethod,
    /// Gateway-side payment reference, when the gateway reports one
    pub payment_id: Option<String>,
}

impl PaymentVerdict {
    pub fn new(order: &Order, method: PaymentMethod, paid: bool, payment_id: Option<String>) -> Self {
        Self {
            order_id: order.order_id.clone(),
            paid,
            method,
            payment_id,
        }
    }
}

/// A payment started for one order
///
/// The gateway callback must come back with `reference`, and it is stored
/// on the order until the payment is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentStart {
    pub order_id: String,
    pub method: PaymentMethod,
    pub reference: String,
    /// Order total in minor units
    pub amount: i64,
    /// Hosted checkout page, for gateways that have one
    pub url: Option<String>,
}

impl PaymentStart {
    pub fn new(order: &Order, method: PaymentMethod, reference: impl Into<String>) -> Self {
        Self {
            order_id: order.order_id.clone(),
            method,
            reference: reference.into(),
            amount: amount_in_cents(order.total),
            url: None,
        }
    }
}

/// Order total in cents
pub fn amount_in_cents(total: f64) -> i64 {
    (to_decimal(total) * rust_decimal::Decimal::from(100))
        .round()
        .to_i64()
        .unwrap_or(0)
}

/// Merchant-chosen reference, for gateways that let the shop pick one
pub fn merchant_reference(order: &Order) -> String {
    format!("{}-{}", order.order_id, shared::util::short_code(6))
}

/// Reference stored when a `method` payment was started for `order`
pub fn started_reference(order: &Order, method: PaymentMethod) -> Option<&str> {
    if order.is_paid() || order.payment_method != Some(method) {
        return None;
    }
    order.payment_id.as_deref().filter(|r| !r.is_empty())
}

/// Whether `candidate` is the reference of the payment started for `order`
pub fn reference_matches(order: &Order, method: PaymentMethod, candidate: &str) -> bool {
    started_reference(order, method) == Some(candidate)
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn method(&self) -> PaymentMethod;

    /// Begin a payment for `order`
    ///
    /// Gateways that create their own order or session override this; the
    /// default hands out a merchant reference.
    async fn start(&self, order: &Order) -> AppResult<PaymentStart> {
        Ok(PaymentStart::new(order, self.method(), merchant_reference(order)))
    }

    /// Ask the gateway whether `order` has been paid
    ///
    /// `Ok` with `paid = false` means the gateway answered "not paid"; `Err`
    /// means the answer could not be obtained.
    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict>;
}

/// Required, non-blank payload field
pub fn field<'a>(payload: &'a Payload, key: &str) -> AppResult<&'a str> {
    payload
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::required(key))
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

pub(crate) fn gateway_error(method: PaymentMethod, err: impl fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::PaymentGatewayError, format!("{method}: {err}"))
        .with_detail("method", method.as_str())
}

/// Configured gateways by method
#[derive(Default, Clone)]
pub struct GatewayRegistry {
    gateways: HashMap<PaymentMethod, Arc<dyn PaymentGateway>>,
    stripe: Option<Arc<StripeGateway>>,
}

impl fmt::Debug for GatewayRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every gateway whose credentials are present
    pub fn from_credentials(creds: &GatewayCredentials, timeout: Duration) -> anyhow::Result<Self> {
        let mut registry = Self::new();

        if let Some(key) = &creds.stripe_secret_key {
            registry.register_stripe(Arc::new(StripeGateway::new(key.clone(), timeout)?));
        }
        if let (Some(id), Some(secret)) = (&creds.paypal_client_id, &creds.paypal_secret_id) {
            registry.register(Arc::new(PayPalGateway::new(
                creds.paypal_api_url.clone(),
                id.clone(),
                secret.clone(),
                timeout,
            )?));
        }
        if let (Some(id), Some(secret)) = (&creds.razorpay_key_id, &creds.razorpay_key_secret) {
            registry.register(Arc::new(RazorpayGateway::new(id.clone(), secret.clone(), timeout)?));
        }
        if let Some(key) = &creds.paystack_secret_key {
            registry.register(Arc::new(PaystackGateway::new(key.clone(), timeout)?));
        }
        if let Some(key) = &creds.flutterwave_secret_key {
            registry.register(Arc::new(FlutterwaveGateway::new(key.clone(), timeout)?));
        }

        tracing::info!(methods = ?registry.methods(), "Payment gateways registered");
        Ok(registry)
    }

    pub fn register(&mut self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(gateway.method(), gateway);
    }

    /// Stripe is also kept typed, for starting checkout sessions
    pub fn register_stripe(&mut self, gateway: Arc<StripeGateway>) {
        self.stripe = Some(gateway.clone());
        self.register(gateway);
    }

    pub fn get(&self, method: PaymentMethod) -> AppResult<Arc<dyn PaymentGateway>> {
        self.gateways.get(&method).cloned().ok_or_else(|| {
            AppError::new(ErrorCode::PaymentGatewayNotConfigured).with_detail("method", method.as_str())
        })
    }

    pub fn stripe(&self) -> AppResult<Arc<StripeGateway>> {
        self.stripe.clone().ok_or_else(|| {
            AppError::new(ErrorCode::PaymentGatewayNotConfigured)
                .with_detail("method", PaymentMethod::Stripe.as_str())
        })
    }

    /// Registered methods in a stable order
    pub fn methods(&self) -> Vec<PaymentMethod> {
        PaymentMethod::ALL
            .into_iter()
            .filter(|m| self.gateways.contains_key(m))
            .collect()
    }
}
