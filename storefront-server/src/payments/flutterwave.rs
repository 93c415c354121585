//! Flutterwave transaction verification by id
//!
//! The shop's `tx_ref` is the merchant reference handed out when the
//! payment was started.

use super::gateway::{
    Payload, PaymentGateway, PaymentVerdict, amount_in_cents, field, gateway_error, http_client,
    started_reference,
};
use crate::utils::AppResult;
use async_trait::async_trait;
use shared::models::{Order, PaymentMethod};
use std::time::Duration;

const FLUTTERWAVE_API: &str = "https://api.flutterwave.com/v3";

#[derive(Debug, Clone)]
pub struct FlutterwaveGateway {
    client: reqwest::Client,
    secret_key: String,
}

/// HTTP 200 and a `successful` transaction carrying the started `tx_ref`
/// and the order total (Flutterwave reports major units)
pub fn transaction_successful(
    status: reqwest::StatusCode,
    body: &serde_json::Value,
    tx_ref: &str,
    amount: i64,
) -> bool {
    let data = &body["data"];
    status == reqwest::StatusCode::OK
        && data["status"].as_str() == Some("successful")
        && data["tx_ref"].as_str() == Some(tx_ref)
        && data["amount"].as_f64().map(amount_in_cents) == Some(amount)
}

impl FlutterwaveGateway {
    pub fn new(secret_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            secret_key,
        })
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Flutterwave
    }

    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict> {
        let transaction_id = field(payload, "transaction_id")?;
        let Some(tx_ref) = started_reference(order, PaymentMethod::Flutterwave) else {
            tracing::warn!(order_id = %order.order_id, "No Flutterwave payment started for this order");
            return Ok(PaymentVerdict::new(order, PaymentMethod::Flutterwave, false, None));
        };
        let resp = self
            .client
            .get(format!(
                "{FLUTTERWAVE_API}/transactions/{}/verify",
                urlencoding::encode(transaction_id)
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Flutterwave, e))?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await.unwrap_or_default();

        Ok(PaymentVerdict::new(
            order,
            PaymentMethod::Flutterwave,
            transaction_successful(status, &body, tx_ref, amount_in_cents(order.total)),
            Some(transaction_id.to_string()),
        ))
    }
}
