//! Stripe Checkout via REST API (no SDK dependency)

use super::gateway::{
    Payload, PaymentGateway, PaymentVerdict, amount_in_cents, field, gateway_error, http_client,
    reference_matches,
};
use crate::utils::AppResult;
use async_trait::async_trait;
use serde::Serialize;
use shared::models::{Order, PaymentMethod};
use std::time::Duration;

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// A created Checkout Session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StripeSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
}

/// A session pays the order when Stripe reports it paid for the order's
/// current total and, if the session carries a reference, that reference is
/// this order
pub fn session_pays_order(session: &serde_json::Value, order: &Order) -> bool {
    let paid = session["payment_status"].as_str() == Some("paid");
    let reference_matches = match session["client_reference_id"].as_str() {
        Some(reference) => reference == order.order_id,
        None => true,
    };
    let amount_matches = session["amount_total"].as_i64() == Some(amount_in_cents(order.total));
    paid && reference_matches && amount_matches
}

impl StripeGateway {
    pub fn new(secret_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            secret_key,
        })
    }

    /// Create a one-line Checkout Session for the order total
    pub async fn start_checkout(
        &self,
        order: &Order,
        customer_email: Option<&str>,
        success_url: &str,
        cancel_url: &str,
    ) -> AppResult<StripeSession> {
        let amount = amount_in_cents(order.total).to_string();
        let name = format!("Order #{}", order.order_id);
        let mut form = vec![
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("client_reference_id", order.order_id.as_str()),
            ("line_items[0][price_data][currency]", "usd"),
            ("line_items[0][price_data][product_data][name]", name.as_str()),
            ("line_items[0][price_data][unit_amount]", amount.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];
        if let Some(email) = customer_email {
            form.push(("customer_email", email));
        }

        let resp: serde_json::Value = self
            .client
            .post(format!("{STRIPE_API}/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Stripe, e))?
            .json()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Stripe, e))?;

        let id = resp["id"].as_str().ok_or_else(|| {
            gateway_error(PaymentMethod::Stripe, format!("create session failed: {resp}"))
        })?;
        Ok(StripeSession {
            id: id.to_string(),
            url: resp["url"].as_str().map(String::from),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Stripe
    }

    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict> {
        let session_id = field(payload, "session_id")?;
        if !reference_matches(order, PaymentMethod::Stripe, session_id) {
            tracing::warn!(order_id = %order.order_id, session_id, "Stripe session was not started for this order");
            return Ok(PaymentVerdict::new(order, PaymentMethod::Stripe, false, None));
        }
        let session: serde_json::Value = self
            .client
            .get(format!("{STRIPE_API}/checkout/sessions/{session_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Stripe, e))?
            .json()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Stripe, e))?;

        let paid = session_pays_order(&session, order);
        let payment_id = session["payment_intent"]
            .as_str()
            .unwrap_or(session_id)
            .to_string();
        Ok(PaymentVerdict::new(order, PaymentMethod::Stripe, paid, Some(payment_id)))
    }
}
