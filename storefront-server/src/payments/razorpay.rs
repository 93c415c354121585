//! Razorpay signed order/payment/signature triple
//!
//! Starting a payment creates a Razorpay order for the order total and
//! stores its id. The checkout widget hands back `razorpay_order_id`,
//! `razorpay_payment_id` and `razorpay_signature`; the signature is
//! `hex(HMAC-SHA256(key_secret, "order_id|payment_id"))` and the Razorpay
//! order id must be the stored one.

use super::gateway::{
    Payload, PaymentGateway, PaymentStart, PaymentVerdict, amount_in_cents, field, gateway_error,
    http_client, reference_matches,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::models::{Order, PaymentMethod};
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

const RAZORPAY_API: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
}

/// Constant-time check of a hex signature
pub fn signature_valid(key_secret: &str, razorpay_order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key_secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{razorpay_order_id}|{payment_id}").as_bytes());
    mac.verify_slice(&expected).is_ok()
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Razorpay
    }

    async fn start(&self, order: &Order) -> AppResult<PaymentStart> {
        let body = serde_json::json!({
            "amount": amount_in_cents(order.total),
            "currency": "USD",
            "receipt": order.order_id,
        });
        let resp: serde_json::Value = self
            .client
            .post(format!("{RAZORPAY_API}/orders"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Razorpay, e))?
            .json()
            .await
            .map_err(|e| gateway_error(PaymentMethod::Razorpay, e))?;

        let id = resp["id"].as_str().ok_or_else(|| {
            gateway_error(PaymentMethod::Razorpay, format!("create order failed: {resp}"))
        })?;
        Ok(PaymentStart::new(order, PaymentMethod::Razorpay, id))
    }

    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict> {
        let razorpay_order_id = field(payload, "razorpay_order_id")?;
        let payment_id = field(payload, "razorpay_payment_id")?;
        let signature = field(payload, "razorpay_signature")?;

        if !signature_valid(&self.key_secret, razorpay_order_id, payment_id, signature) {
            return Err(AppError::new(ErrorCode::PaymentSignatureInvalid)
                .with_detail("order_id", order.order_id.as_str()));
        }
        // a genuine triple for some other Razorpay order pays nothing here
        let paid = reference_matches(order, PaymentMethod::Razorpay, razorpay_order_id);
        if !paid {
            tracing::warn!(order_id = %order.order_id, razorpay_order_id, "Razorpay order was not started for this order");
        }
        Ok(PaymentVerdict::new(
            order,
            PaymentMethod::Razorpay,
            paid,
            Some(payment_id.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, PaymentStatus};

    const RAZORPAY_ORDER: &str = "order_9A33XWu170gUtm";

    fn sign(key_secret: &str, razorpay_order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes()).unwrap();
        mac.update(format!("{razorpay_order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn gateway() -> RazorpayGateway {
        RazorpayGateway::new("rzp_test".into(), "secret".into(), Duration::from_millis(50)).unwrap()
    }

    /// Order 77770001 with a Razorpay payment started as [`RAZORPAY_ORDER`]
    fn order() -> Order {
        Order {
            order_id: "77770001".into(),
            customer_id: Some(1),
            address_id: None,
            cart_id: None,
            sub_total: 500.0,
            shipping: 0.0,
            tax: 0.0,
            service_fee: 0.0,
            total: 500.0,
            initial_total: 500.0,
            saved: 0.0,
            payment_status: PaymentStatus::Processing,
            payment_method: Some(PaymentMethod::Razorpay),
            payment_id: Some(RAZORPAY_ORDER.into()),
            order_status: OrderStatus::Pending,
            created_at: 1,
        }
    }

    fn payload(razorpay_order_id: &str, payment_id: &str, signature: &str) -> Payload {
        Payload::from([
            ("razorpay_order_id".to_string(), razorpay_order_id.to_string()),
            ("razorpay_payment_id".to_string(), payment_id.to_string()),
            ("razorpay_signature".to_string(), signature.to_string()),
        ])
    }

    #[test]
    fn test_signature_round_trip() {
        let sig = sign("secret", "order_1", "pay_1");
        assert_eq!(sig.len(), 64);
        assert!(signature_valid("secret", "order_1", "pay_1", &sig));
        assert!(!signature_valid("other", "order_1", "pay_1", &sig));
        assert!(!signature_valid("secret", "order_1", "pay_2", &sig));
        assert!(!signature_valid("secret", "order_1", "pay_1", "not-hex"));
    }

    #[tokio::test]
    async fn test_verify() {
        let good = sign("secret", RAZORPAY_ORDER, "pay_29QQoUBi66xm2f");

        let verdict = gateway()
            .verify(&order(), &payload(RAZORPAY_ORDER, "pay_29QQoUBi66xm2f", &good))
            .await
            .unwrap();
        assert!(verdict.paid);
        assert_eq!(verdict.payment_id.as_deref(), Some("pay_29QQoUBi66xm2f"));

        let err = gateway()
            .verify(&order(), &payload(RAZORPAY_ORDER, "pay_29QQoUBi66xm2f", &"0".repeat(64)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentSignatureInvalid);

        let err = gateway().verify(&order(), &Payload::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[tokio::test]
    async fn test_signed_triple_for_another_order_does_not_pay() {
        let cheap = sign("secret", "order_OTHER", "pay_cheap");
        let verdict = gateway()
            .verify(&order(), &payload("order_OTHER", "pay_cheap", &cheap))
            .await
            .unwrap();
        assert!(!verdict.paid);

        // nothing started: any triple is refused
        let mut fresh = order();
        fresh.payment_method = None;
        fresh.payment_id = None;
        let good = sign("secret", RAZORPAY_ORDER, "pay_1");
        let verdict = gateway()
            .verify(&fresh, &payload(RAZORPAY_ORDER, "pay_1", &good))
            .await
            .unwrap();
        assert!(!verdict.paid);
    }
}
