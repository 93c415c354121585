//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ProductNotFound
            | Self::ProductNotPublished
            | Self::CategoryNotFound
            | Self::CartLineNotFound
            | Self::AddressNotOwned
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::CouponNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::OrderAlreadyPaid | Self::CouponAlreadyApplied => {
                StatusCode::CONFLICT
            }

            // 402 Payment Required
            Self::PaymentNotConfirmed | Self::PaymentSignatureInvalid => {
                StatusCode::PAYMENT_REQUIRED
            }

            // 502 Bad Gateway (upstream answered with garbage)
            Self::PaymentGatewayError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError
            | Self::TimeoutError
            | Self::ExternalServiceDegraded
            | Self::PaymentGatewayNotConfigured => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
