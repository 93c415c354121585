//! Payment Reconciler
//!
//! Normalizes gateway callbacks into a paid/failed outcome and moves the
//! order `Processing → Paid` exactly once. The transition is a conditional
//! update, so concurrent duplicate callbacks cannot both win; only the
//! winning call clears the cart and notifies the buyer and vendors.
//!
//! Every payment is started first. The gateway reference issued at that
//! point is stored on the order, and a callback only counts for the order
//! whose started reference it carries.
//!
//! A failed or unanswered verification is not persisted: the order stays
//! `Processing` and the shopper can retry.

use super::gateway::{GatewayRegistry, Payload, PaymentStart, PaymentVerdict, started_reference};
use super::stripe::StripeSession;
use crate::db::repository::{address, cart, order};
use crate::notify::NotificationService;
use crate::payment_log;
use crate::utils::{AppError, AppResult, ErrorCode};
use serde::Serialize;
use shared::models::{Order, PaymentMethod};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentResult {
    Paid,
    Failed,
}

impl PaymentResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentResult::Paid => "paid",
            PaymentResult::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentOutcome {
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentResult,
    /// True only for the confirmation that moved the order to Paid
    pub transitioned: bool,
    /// Status page the shopper is sent to
    pub redirect: String,
}

impl PaymentOutcome {
    fn new(order_id: &str, method: PaymentMethod, status: PaymentResult, transitioned: bool) -> Self {
        Self {
            order_id: order_id.to_string(),
            method,
            status,
            transitioned,
            redirect: status_redirect(order_id, status),
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentResult::Paid
    }
}

fn parse_method(method: &str) -> AppResult<PaymentMethod> {
    method
        .parse()
        .map_err(|_| AppError::new(ErrorCode::PaymentMethodUnsupported).with_detail("method", method))
}

pub fn status_redirect(order_id: &str, status: PaymentResult) -> String {
    format!("/payment_status/{order_id}/?payment_status={}", status.as_str())
}

#[derive(Debug, Clone)]
pub struct PaymentService {
    pool: SqlitePool,
    gateways: Arc<GatewayRegistry>,
    notifier: NotificationService,
    /// Upper bound for one whole gateway verification
    verify_timeout: Duration,
    public_base_url: String,
}

impl PaymentService {
    pub fn new(
        pool: SqlitePool,
        gateways: Arc<GatewayRegistry>,
        notifier: NotificationService,
        verify_timeout: Duration,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            gateways,
            notifier,
            verify_timeout,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn gateways(&self) -> &GatewayRegistry {
        &self.gateways
    }

    async fn load(&self, order_id: &str) -> AppResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id))
    }

    /// Order shown on the payment status page
    pub async fn payment_status(&self, order_id: &str) -> AppResult<Order> {
        self.load(order_id).await
    }

    /// Create a Stripe Checkout Session and remember its id on the order
    pub async fn start_stripe_checkout(&self, order_id: &str) -> AppResult<StripeSession> {
        let current = self.load(order_id).await?;
        if current.is_paid() {
            return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order_id));
        }
        let gateway = self.gateways.stripe()?;
        let email = match current.address_id {
            Some(id) => address::find_by_id(&self.pool, id).await?.and_then(|a| a.email),
            None => None,
        };

        let success_url = format!(
            "{}/api/payments/stripe/{order_id}/verify?session_id={{CHECKOUT_SESSION_ID}}",
            self.public_base_url
        );
        let cancel_url = format!(
            "{}{}",
            self.public_base_url,
            status_redirect(order_id, PaymentResult::Failed)
        );
        let session = gateway
            .start_checkout(&current, email.as_deref(), &success_url, &cancel_url)
            .await?;
        order::set_payment_reference(&self.pool, order_id, PaymentMethod::Stripe, &session.id).await?;

        payment_log!(order_id, "checkout_started", method = "stripe", session_id = %session.id);
        Ok(session)
    }

    /// Start a `method` payment and remember its reference on the order
    ///
    /// Starting again replaces the previous reference.
    pub async fn start_checkout(&self, order_id: &str, method: &str) -> AppResult<PaymentStart> {
        let method = parse_method(method)?;
        if method == PaymentMethod::Stripe {
            let session = self.start_stripe_checkout(order_id).await?;
            let current = self.load(order_id).await?;
            let mut start = PaymentStart::new(&current, method, session.id);
            start.url = session.url;
            return Ok(start);
        }

        let current = self.load(order_id).await?;
        if current.is_paid() {
            return Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order_id));
        }
        let gateway = self.gateways.get(method)?;
        let start = match tokio::time::timeout(self.verify_timeout, gateway.start(&current)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::new(ErrorCode::PaymentGatewayError)
                    .with_detail("method", method.as_str())
                    .with_detail("order_id", order_id));
            }
        };
        order::set_payment_reference(&self.pool, order_id, method, &start.reference).await?;

        payment_log!(order_id, "checkout_started", method = %method, reference = %start.reference);
        Ok(start)
    }

    /// Confirm a payment reported through `method`'s callback
    ///
    /// Errors only for requests that can never succeed (unknown order,
    /// unsupported or unconfigured method). Everything the gateway says or
    /// fails to say becomes a `Failed` outcome.
    pub async fn confirm(&self, order_id: &str, method: &str, payload: &Payload) -> AppResult<PaymentOutcome> {
        let method = parse_method(method)?;
        let current = self.load(order_id).await?;

        if current.is_paid() {
            payment_log!(order_id, "duplicate_confirmation", method = %method);
            return Ok(PaymentOutcome::new(order_id, method, PaymentResult::Paid, false));
        }

        let gateway = self.gateways.get(method)?;
        let failed = || PaymentOutcome::new(order_id, method, PaymentResult::Failed, false);

        let Some(reference) = started_reference(&current, method).map(String::from) else {
            payment_log!(order_id, "not_started", method = %method);
            return Ok(failed());
        };

        let verdict: PaymentVerdict =
            match tokio::time::timeout(self.verify_timeout, gateway.verify(&current, payload)).await {
                Ok(Ok(verdict)) => verdict,
                Ok(Err(e)) => {
                    tracing::warn!(order_id = %order_id, method = %method, error = %e, "Payment verification failed");
                    payment_log!(order_id, "verify_error", method = %method, error = %e);
                    return Ok(failed());
                }
                Err(_) => {
                    tracing::warn!(order_id = %order_id, method = %method, timeout_ms = self.verify_timeout.as_millis() as u64, "Payment verification timed out");
                    payment_log!(order_id, "verify_timeout", method = %method);
                    return Ok(failed());
                }
            };

        if !verdict.paid {
            payment_log!(order_id, "not_paid", method = %method);
            return Ok(failed());
        }

        let transitioned = order::mark_paid(
            &self.pool,
            order_id,
            method,
            &reference,
            verdict.payment_id.as_deref(),
        )
        .await?;
        let latest = self.load(order_id).await?;
        if transitioned {
            payment_log!(order_id, "paid", method = %method, total = latest.total);
            self.after_paid(&latest).await;
        } else if latest.is_paid() {
            payment_log!(order_id, "already_paid", method = %method);
        } else {
            // the order changed (coupon, restarted payment) while the gateway was asked
            payment_log!(order_id, "reference_superseded", method = %method);
            return Ok(failed());
        }
        Ok(PaymentOutcome::new(order_id, method, PaymentResult::Paid, transitioned))
    }

    /// Side effects of the Processing → Paid transition; never fail the payment
    async fn after_paid(&self, paid: &Order) {
        let cart_id = paid.cart_id.as_deref().unwrap_or_default();
        match cart::clear(&self.pool, cart_id, paid.customer_id).await {
            Ok(lines) => tracing::debug!(order_id = %paid.order_id, lines, "Cart cleared"),
            Err(e) => tracing::warn!(order_id = %paid.order_id, error = %e, "Failed to clear cart"),
        }
        if let Err(e) = self.notifier.order_paid(paid).await {
            tracing::warn!(order_id = %paid.order_id, error = %e, "Failed to notify about paid order");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::gateway::PaymentGateway;
    use super::*;
    use crate::cart::CartService;
    use crate::checkout::CheckoutService;
    use crate::db::repository::{notification, testing};
    use crate::notify::mail::testing::RecordingMailer;
    use crate::pricing::{ServiceFee, StaticTaxTable};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::models::{CartLineUpsert, PaymentStatus};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Answer {
        Paid,
        NotPaid,
        Broken,
        Slow,
    }

    struct FakeGateway {
        answer: Answer,
        calls: AtomicUsize,
    }

    impl FakeGateway {
        fn new(answer: Answer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        fn method(&self) -> PaymentMethod {
            PaymentMethod::Paystack
        }

        async fn verify(&self, order: &Order, _payload: &Payload) -> AppResult<PaymentVerdict> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answer {
                Answer::Paid => Ok(PaymentVerdict::new(order, PaymentMethod::Paystack, true, Some("ref-1".into()))),
                Answer::NotPaid => Ok(PaymentVerdict::new(order, PaymentMethod::Paystack, false, None)),
                Answer::Broken => Err(AppError::gateway("connection reset")),
                Answer::Slow => {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok(PaymentVerdict::new(order, PaymentMethod::Paystack, true, None))
                }
            }
        }
    }

    struct Fixture {
        payments: PaymentService,
        carts: CartService,
        mailer: Arc<RecordingMailer>,
        gateway: Arc<FakeGateway>,
        pool: SqlitePool,
        order_id: String,
    }

    /// Customer 1 checks out a two-vendor cart under token "tok"
    async fn fixture(answer: Answer) -> Fixture {
        let pool = testing::pool().await;
        let north = testing::vendor(&pool, "North").await;
        let south = testing::vendor(&pool, "South").await;
        let mut shirt = testing::product_data("Shirt", 10.0);
        shirt.vendor_id = Some(north);
        let shirt = testing::product(&pool, shirt).await;
        let mut socks = testing::product_data("Socks", 5.0);
        socks.vendor_id = Some(south);
        let socks = testing::product(&pool, socks).await;
        let address = testing::address(&pool, 1, "KG").await;

        let carts = CartService::new(pool.clone());
        for product_id in [shirt, socks] {
            carts
                .add_or_update(
                    "tok",
                    Some(1),
                    CartLineUpsert {
                        product_id,
                        qty: 1,
                        size: None,
                        color: None,
                    },
                )
                .await
                .unwrap();
        }
        let checkout = CheckoutService::new(
            pool.clone(),
            Arc::new(StaticTaxTable::new(HashMap::new(), Decimal::ZERO)),
            ServiceFee::default(),
            Duration::from_millis(200),
        );
        let order_id = checkout
            .place_order("tok", Some(address), 1)
            .await
            .unwrap()
            .order
            .order_id;

        let gateway = FakeGateway::new(answer);
        let mut registry = GatewayRegistry::new();
        registry.register(gateway.clone());
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = NotificationService::new(pool.clone(), mailer.clone(), "shop@test");
        let payments = PaymentService::new(
            pool.clone(),
            Arc::new(registry),
            notifier,
            Duration::from_millis(100),
            "http://shop.test/",
        );
        payments.start_checkout(&order_id, "paystack").await.unwrap();
        Fixture {
            payments,
            carts,
            mailer,
            gateway,
            pool,
            order_id,
        }
    }

    fn payload() -> Payload {
        Payload::from([("reference".to_string(), "ref-1".to_string())])
    }

    #[tokio::test]
    async fn test_confirmation_marks_paid_and_fires_side_effects_once() {
        let f = fixture(Answer::Paid).await;

        let first = f.payments.confirm(&f.order_id, "paystack", &payload()).await.unwrap();
        assert!(first.is_paid());
        assert!(first.transitioned);
        assert_eq!(
            first.redirect,
            format!("/payment_status/{}/?payment_status=paid", f.order_id)
        );

        let stored = f.payments.payment_status(&f.order_id).await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert_eq!(stored.payment_method, Some(PaymentMethod::Paystack));
        assert_eq!(stored.payment_id.as_deref(), Some("ref-1"));
        assert!(f.carts.list("tok").await.unwrap().is_empty);
        assert_eq!(notification::list_for_order(&f.pool, &f.order_id).await.unwrap().len(), 3);
        assert_eq!(f.mailer.sent.lock().len(), 3);

        // the gateway calls back again
        let second = f.payments.confirm(&f.order_id, "paystack", &payload()).await.unwrap();
        assert!(second.is_paid());
        assert!(!second.transitioned);
        assert_eq!(notification::list_for_order(&f.pool, &f.order_id).await.unwrap().len(), 3);
        assert_eq!(f.mailer.sent.lock().len(), 3);
        assert_eq!(f.gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_confirmations_transition_once() {
        let f = fixture(Answer::Paid).await;
        let p = payload();
        let (a, b) = tokio::join!(
            f.payments.confirm(&f.order_id, "paystack", &p),
            f.payments.confirm(&f.order_id, "paystack", &p)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(a.is_paid() && b.is_paid());
        assert!(a.transitioned ^ b.transitioned);
        assert_eq!(notification::list_for_order(&f.pool, &f.order_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unconfirmed_payment_leaves_order_processing() {
        for answer in [Answer::NotPaid, Answer::Broken, Answer::Slow] {
            let f = fixture(answer).await;
            let outcome = f.payments.confirm(&f.order_id, "paystack", &payload()).await.unwrap();
            assert_eq!(outcome.status, PaymentResult::Failed);
            assert!(!outcome.transitioned);
            assert!(outcome.redirect.ends_with("payment_status=failed"));

            let stored = f.payments.payment_status(&f.order_id).await.unwrap();
            assert_eq!(stored.payment_status, PaymentStatus::Processing);
            assert_eq!(f.carts.count("tok").await.unwrap(), 2);
            assert!(notification::list_for_order(&f.pool, &f.order_id).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_start_stores_reference_on_order() {
        let f = fixture(Answer::Paid).await;
        let restarted = f.payments.start_checkout(&f.order_id, "paystack").await.unwrap();
        assert!(restarted.reference.starts_with(&f.order_id));

        let stored = f.payments.payment_status(&f.order_id).await.unwrap();
        assert_eq!(stored.payment_method, Some(PaymentMethod::Paystack));
        assert_eq!(stored.payment_id.as_deref(), Some(restarted.reference.as_str()));
        assert_eq!(restarted.amount, crate::payments::gateway::amount_in_cents(stored.total));
    }

    #[tokio::test]
    async fn test_callback_without_started_payment_is_not_verified() {
        let f = fixture(Answer::Paid).await;
        sqlx::query("UPDATE orders SET payment_method = NULL, payment_id = NULL WHERE order_id = ?")
            .bind(&f.order_id)
            .execute(&f.pool)
            .await
            .unwrap();

        let outcome = f.payments.confirm(&f.order_id, "paystack", &payload()).await.unwrap();
        assert_eq!(outcome.status, PaymentResult::Failed);
        assert_eq!(f.gateway.calls.load(Ordering::SeqCst), 0);
        let stored = f.payments.payment_status(&f.order_id).await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Processing);
    }

    #[tokio::test]
    async fn test_request_errors() {
        let f = fixture(Answer::Paid).await;

        let err = f.payments.confirm(&f.order_id, "cash", &payload()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMethodUnsupported);
        let err = f.payments.confirm(&f.order_id, "stripe", &payload()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentGatewayNotConfigured);
        let err = f.payments.confirm("missing", "paystack", &payload()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        let err = f.payments.start_stripe_checkout(&f.order_id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentGatewayNotConfigured);
        let err = f.payments.start_checkout(&f.order_id, "razorpay").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentGatewayNotConfigured);
        let err = f.payments.start_checkout(&f.order_id, "cash").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMethodUnsupported);
    }
}
