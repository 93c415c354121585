//! Unified error codes for the storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Catalog errors
//! - 2xxx: Cart errors
//! - 3xxx: Checkout errors
//! - 4xxx: Order errors
//! - 5xxx: Coupon errors
//! - 6xxx: Payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so API clients can switch
/// on a number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Catalog ====================
    /// Product does not exist
    ProductNotFound = 1001,
    /// Product exists but is not published
    ProductNotPublished = 1002,
    /// Category does not exist
    CategoryNotFound = 1101,

    // ==================== 2xxx: Cart ====================
    /// Cart has no lines
    CartEmpty = 2001,
    /// Cart line not found for this cart
    CartLineNotFound = 2002,
    /// Requested quantity is larger than the stock on hand
    QuantityExceedsStock = 2003,
    /// Quantity must be at least one
    InvalidQuantity = 2004,

    // ==================== 3xxx: Checkout ====================
    /// No address supplied at checkout
    AddressRequired = 3001,
    /// Address does not belong to the customer
    AddressNotOwned = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order item not found
    OrderItemNotFound = 4003,

    // ==================== 5xxx: Coupon ====================
    /// Coupon code does not exist
    CouponNotFound = 5001,
    /// Coupon code missing
    CouponCodeRequired = 5002,
    /// Coupon already attached to the order
    CouponAlreadyApplied = 5003,

    // ==================== 6xxx: Payment ====================
    /// Gateway did not confirm the payment
    PaymentNotConfirmed = 6001,
    /// Gateway returned an error or an unreadable response
    PaymentGatewayError = 6002,
    /// Gateway signature did not match
    PaymentSignatureInvalid = 6003,
    /// Payment method is not supported
    PaymentMethodUnsupported = 6004,
    /// Gateway credentials are missing
    PaymentGatewayNotConfigured = 6005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// External collaborator unavailable, default value used
    ExternalServiceDegraded = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductNotPublished => "Product is not available",
            ErrorCode::CategoryNotFound => "Category not found",

            // Cart
            ErrorCode::CartEmpty => "Your cart is empty",
            ErrorCode::CartLineNotFound => "Cart item not found",
            ErrorCode::QuantityExceedsStock => "Requested quantity exceeds stock",
            ErrorCode::InvalidQuantity => "Quantity must be at least 1",

            // Checkout
            ErrorCode::AddressRequired => "Please select an address",
            ErrorCode::AddressNotOwned => "Address not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderItemNotFound => "Order item not found",

            // Coupon
            ErrorCode::CouponNotFound => "Coupon does not exist",
            ErrorCode::CouponCodeRequired => "Coupon code is required",
            ErrorCode::CouponAlreadyApplied => "Coupon already activated",

            // Payment
            ErrorCode::PaymentNotConfirmed => "Payment was not confirmed",
            ErrorCode::PaymentGatewayError => "Payment gateway error",
            ErrorCode::PaymentSignatureInvalid => "Payment signature is invalid",
            ErrorCode::PaymentMethodUnsupported => "Payment method is not supported",
            ErrorCode::PaymentGatewayNotConfigured => "Payment gateway is not configured",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ExternalServiceDegraded => "External service unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Catalog
            1001 => Ok(ErrorCode::ProductNotFound),
            1002 => Ok(ErrorCode::ProductNotPublished),
            1101 => Ok(ErrorCode::CategoryNotFound),

            // Cart
            2001 => Ok(ErrorCode::CartEmpty),
            2002 => Ok(ErrorCode::CartLineNotFound),
            2003 => Ok(ErrorCode::QuantityExceedsStock),
            2004 => Ok(ErrorCode::InvalidQuantity),

            // Checkout
            3001 => Ok(ErrorCode::AddressRequired),
            3002 => Ok(ErrorCode::AddressNotOwned),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderItemNotFound),

            // Coupon
            5001 => Ok(ErrorCode::CouponNotFound),
            5002 => Ok(ErrorCode::CouponCodeRequired),
            5003 => Ok(ErrorCode::CouponAlreadyApplied),

            // Payment
            6001 => Ok(ErrorCode::PaymentNotConfirmed),
            6002 => Ok(ErrorCode::PaymentGatewayError),
            6003 => Ok(ErrorCode::PaymentSignatureInvalid),
            6004 => Ok(ErrorCode::PaymentMethodUnsupported),
            6005 => Ok(ErrorCode::PaymentGatewayNotConfigured),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ExternalServiceDegraded),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorCode; 35] = [
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidFormat,
        ErrorCode::RequiredField,
        ErrorCode::ValueOutOfRange,
        ErrorCode::ProductNotFound,
        ErrorCode::ProductNotPublished,
        ErrorCode::CategoryNotFound,
        ErrorCode::CartEmpty,
        ErrorCode::CartLineNotFound,
        ErrorCode::QuantityExceedsStock,
        ErrorCode::InvalidQuantity,
        ErrorCode::AddressRequired,
        ErrorCode::AddressNotOwned,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderAlreadyPaid,
        ErrorCode::OrderItemNotFound,
        ErrorCode::CouponNotFound,
        ErrorCode::CouponCodeRequired,
        ErrorCode::CouponAlreadyApplied,
        ErrorCode::PaymentNotConfirmed,
        ErrorCode::PaymentGatewayError,
        ErrorCode::PaymentSignatureInvalid,
        ErrorCode::PaymentMethodUnsupported,
        ErrorCode::PaymentGatewayNotConfigured,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::NetworkError,
        ErrorCode::TimeoutError,
        ErrorCode::ConfigError,
        ErrorCode::ExternalServiceDegraded,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ProductNotFound.code(), 1001);
        assert_eq!(ErrorCode::QuantityExceedsStock.code(), 2003);
        assert_eq!(ErrorCode::AddressNotOwned.code(), 3002);
        assert_eq!(ErrorCode::OrderAlreadyPaid.code(), 4002);
        assert_eq!(ErrorCode::CouponNotFound.code(), 5001);
        assert_eq!(ErrorCode::PaymentNotConfirmed.code(), 6001);
        assert_eq!(ErrorCode::ExternalServiceDegraded.code(), 9006);
    }

    #[test]
    fn test_try_from_covers_every_code() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(7001), Err(InvalidErrorCode(7001)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::CartEmpty.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");

        let code: ErrorCode = serde_json::from_str("2003").unwrap();
        assert_eq!(code, ErrorCode::QuantityExceedsStock);

        let result: Result<ErrorCode, _> = serde_json::from_str("4242");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::CouponAlreadyApplied), "5003");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::CouponAlreadyApplied.message(), "Coupon already activated");
        assert_eq!(ErrorCode::CartEmpty.message(), "Your cart is empty");
        for code in ALL {
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
