//! Paystack transaction verification by reference
//!
//! The reference is the merchant reference handed out when the payment was
//! started; the transaction must carry it and the order total.

use super::gateway::{
    Payload, PaymentGateway, PaymentVerdict, amount_in_cents, field, gateway_error, http_client,
    reference_matches,
};
use crate::utils::AppResult;
use async_trait::async_trait;
use shared::models::{Order, PaymentMethod};
use std::time::Duration;

const PAYSTACK_API: &str = "https://api.paystack.co";

#[derive(Debug, Clone)]
pub struct PaystackGateway {
    client: reqwest::Client,
    secret_key: String,
}

/// `{"status": true, "data": {"status": "success"}}` for this reference and
/// amount (in kobo/cents) is the only paid shape
pub fn transaction_succeeded(body: &serde_json::Value, reference: &str, amount: i64) -> bool {
    let data = &body["data"];
    body["status"].as_bool() == Some(true)
        && data["status"].as_str() == Some("success")
        && data["reference"].as_str() == Some(reference)
        && data["amount"].as_i64() == Some(amount)
}

impl PaystackGateway {
    pub fn new(secret_key: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            secret_key,
        })
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Paystack
    }

    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict> {
        let reference = field(payload, "reference")?;
        if !reference_matches(order, PaymentMethod::Paystack, reference) {
            tracing::warn!(order_id = %order.order_id, reference, "Paystack reference was not issued for this order");
            return Ok(PaymentVerdict::new(order, PaymentMethod::Paystack, false, None));
        }
        let body: serde_json::Value = self
            .client
            .get(format!(
                "{PAYSTACK_API}/transaction/verify/{}",
                urlencoding::encode(reference)
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Paystack, e))?
            .json()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Paystack, e))?;

        Ok(PaymentVerdict::new(
            order,
            PaymentMethod::Paystack,
            transaction_succeeded(&body, reference, amount_in_cents(order.total)),
            Some(reference.to_string()),
        ))
    }
}
