//! Shopper context extractor
//!
//! Everything a handler needs to know about the caller, read from headers
//! once and passed down explicitly.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use http::HeaderMap;
use http::request::Parts;

use crate::locale::Currency;
use crate::utils::{AppError, AppResult};

pub const CART_TOKEN_HEADER: &str = "x-cart-token";
pub const CUSTOMER_HEADER: &str = "x-customer-id";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const CURRENCY_HEADER: &str = "x-currency";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopperContext {
    pub cart_token: Option<String>,
    pub customer_id: Option<i64>,
    pub ip: Option<IpAddr>,
    /// Explicit currency choice; unsupported codes are ignored
    pub currency: Option<Currency>,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl ShopperContext {
    /// First `X-Forwarded-For` entry wins over the socket peer
    pub fn from_headers(headers: &HeaderMap, peer: Option<IpAddr>) -> Self {
        let forwarded = header(headers, FORWARDED_FOR_HEADER)
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());

        Self {
            cart_token: header(headers, CART_TOKEN_HEADER).map(String::from),
            customer_id: header(headers, CUSTOMER_HEADER).and_then(|v| v.parse().ok()),
            ip: forwarded.or(peer),
            currency: header(headers, CURRENCY_HEADER).and_then(|v| v.parse().ok()),
        }
    }

    /// Cart token or empty (an empty token reads as an empty cart)
    pub fn cart_token_or_empty(&self) -> &str {
        self.cart_token.as_deref().unwrap_or_default()
    }

    /// Signed-in customer, required
    pub fn customer(&self) -> AppResult<i64> {
        self.customer_id.ok_or_else(|| AppError::required(CUSTOMER_HEADER))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ShopperContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_headers_are_parsed_leniently() {
        let mut headers = HeaderMap::new();
        headers.insert(CART_TOKEN_HEADER, HeaderValue::from_static(" abc "));
        headers.insert(CUSTOMER_HEADER, HeaderValue::from_static("42"));
        headers.insert(FORWARDED_FOR_HEADER, HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        headers.insert(CURRENCY_HEADER, HeaderValue::from_static("kzt"));

        let ctx = ShopperContext::from_headers(&headers, Some("127.0.0.1".parse().unwrap()));
        assert_eq!(ctx.cart_token.as_deref(), Some("abc"));
        assert_eq!(ctx.customer().unwrap(), 42);
        assert_eq!(ctx.ip, Some("203.0.113.9".parse().unwrap()));
        assert_eq!(ctx.currency, Some(Currency::Kzt));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let mut headers = HeaderMap::new();
        headers.insert(CUSTOMER_HEADER, HeaderValue::from_static("abc"));
        headers.insert(FORWARDED_FOR_HEADER, HeaderValue::from_static("not-an-ip"));
        headers.insert(CURRENCY_HEADER, HeaderValue::from_static("EUR"));

        let peer: IpAddr = "198.51.100.7".parse().unwrap();
        let ctx = ShopperContext::from_headers(&headers, Some(peer));
        assert_eq!(ctx.customer_id, None);
        assert_eq!(ctx.ip, Some(peer));
        assert_eq!(ctx.currency, None);
        assert_eq!(ctx.cart_token_or_empty(), "");
        assert!(ctx.customer().is_err());
    }
}
