//! PayPal order lookup (client-credentials token, then the order)
//!
//! The PayPal order is created client-side with the merchant reference as
//! the purchase unit's `custom_id`.

use super::gateway::{
    Payload, PaymentGateway, PaymentVerdict, amount_in_cents, field, gateway_error, http_client,
    started_reference,
};
use crate::utils::AppResult;
use async_trait::async_trait;
use shared::models::{Order, PaymentMethod};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PayPalGateway {
    client: reqwest::Client,
    api_base: String,
    client_id: String,
    secret: String,
}

/// Only a COMPLETED PayPal order for this reference and amount counts as paid
pub fn order_completed(
    status: reqwest::StatusCode,
    body: &serde_json::Value,
    reference: &str,
    amount: i64,
) -> bool {
    let unit = &body["purchase_units"][0];
    let unit_amount = unit["amount"]["value"]
        .as_str()
        .and_then(|v| v.parse::<f64>().ok())
        .map(amount_in_cents);
    status.is_success()
        && body["status"].as_str() == Some("COMPLETED")
        && unit["custom_id"].as_str() == Some(reference)
        && unit_amount == Some(amount)
}

impl PayPalGateway {
    pub fn new(
        api_base: String,
        client_id: String,
        secret: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id,
            secret,
        })
    }

    async fn access_token(&self) -> AppResult<String> {
        let resp = self
            .client
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::PayPal, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(gateway_error(
                PaymentMethod::PayPal,
                format!("access token request failed with {status}"),
            ));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| gateway_error(PaymentMethod::PayPal, e))?;
        body["access_token"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| gateway_error(PaymentMethod::PayPal, "access token missing"))
    }
}

#[async_trait]
impl PaymentGateway for PayPalGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::PayPal
    }

    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict> {
        let transaction_id = field(payload, "transaction_id")?;
        let Some(reference) = started_reference(order, PaymentMethod::PayPal) else {
            tracing::warn!(order_id = %order.order_id, "No PayPal payment started for this order");
            return Ok(PaymentVerdict::new(order, PaymentMethod::PayPal, false, None));
        };
        let token = self.access_token().await?;
        let resp = self
            .client
            .get(format!("{}/v2/checkout/orders/{transaction_id}", self.api_base))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::PayPal, e))?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await.unwrap_or_default();

        let paid = order_completed(status, &body, reference, amount_in_cents(order.total));
        if !paid {
            tracing::debug!(order_id = %order.order_id, http = %status, paypal_status = ?body["status"], "PayPal order not completed");
        }
        Ok(PaymentVerdict::new(
            order,
            PaymentMethod::PayPal,
            paid,
            Some(transaction_id.to_string()),
        ))
    }
}
