//! Order Models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Coupon;

/// Persisted payment state of an order
///
/// `Processing` is the initial and retry state; `Paid` is terminal. A failed
/// confirmation leaves the order in `Processing`, `Failed` exists for
/// records imported or cancelled by back-office tooling.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentStatus {
    #[default]
    Processing,
    Paid,
    Failed,
}

/// Supported payment gateways
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    Stripe,
    PayPal,
    Razorpay,
    Paystack,
    Flutterwave,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Stripe,
        PaymentMethod::PayPal,
        PaymentMethod::Razorpay,
        PaymentMethod::Paystack,
        PaymentMethod::Flutterwave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Razorpay => "razorpay",
            PaymentMethod::Paystack => "paystack",
            PaymentMethod::Flutterwave => "flutterwave",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

/// Fulfilment state of an order or a single order item
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Fulfilled,
    Cancelled,
}

/// Carrier used to ship an order item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ShippingService {
    Dhl,
    Fedex,
    Ups,
    GigLogistics,
}

/// Order header, snapshotted from a cart at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    /// Public reference shown to the shopper
    pub order_id: String,
    pub customer_id: Option<i64>,
    pub address_id: Option<i64>,
    /// Cart the order was snapshotted from; cleared once payment is confirmed
    pub cart_id: Option<String>,
    pub sub_total: f64,
    pub shipping: f64,
    pub tax: f64,
    pub service_fee: f64,
    pub total: f64,
    /// Total before any coupon
    pub initial_total: f64,
    pub saved: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_id: Option<String>,
    pub order_status: OrderStatus,
    pub created_at: i64,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    /// Public reference used by the order tracker
    pub item_id: String,
    pub order_id: String,
    pub product_id: i64,
    pub vendor_id: Option<i64>,
    pub qty: i64,
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: f64,
    pub sub_total: f64,
    pub shipping: f64,
    pub tax: f64,
    pub total: f64,
    pub initial_total: f64,
    pub saved: f64,
    pub applied_coupon: bool,
    pub order_status: OrderStatus,
    pub shipping_service: Option<ShippingService>,
    pub tracking_id: Option<String>,
    pub created_at: i64,
}

/// Order with everything hanging off it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub vendor_ids: Vec<i64>,
    pub coupons: Vec<Coupon>,
}

/// Checkout request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Address id; required, kept optional so a missing value maps to a
    /// domain error instead of a deserialization failure
    #[serde(default)]
    pub address: Option<i64>,
}

/// Coupon request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponRequest {
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// Order tracker answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingInfo {
    pub item: OrderItem,
    pub product_name: String,
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("Stripe".parse::<PaymentMethod>(), Ok(PaymentMethod::Stripe));
        assert_eq!(" paypal ".parse::<PaymentMethod>(), Ok(PaymentMethod::PayPal));
        assert_eq!(
            "FLUTTERWAVE".parse::<PaymentMethod>(),
            Ok(PaymentMethod::Flutterwave)
        );
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::PayPal).unwrap(),
            "\"paypal\""
        );
        assert_eq!(
            serde_json::to_string(&ShippingService::GigLogistics).unwrap(),
            "\"gig_logistics\""
        );
    }
}
