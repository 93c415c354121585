//! Currency localization
//!
//! Picks a display currency for a shopper from their IP address and converts
//! USD catalog prices into it. Both remote collaborators (geolocation and
//! exchange rates) are time-bounded and cached; when either is slow or down
//! the shopper still gets a page, priced with the fallback table, and the
//! result is marked `Degraded`.

pub mod cache;
pub mod currency;
pub mod sources;

pub use cache::TtlCache;
pub use currency::{Currency, convert_price, format_price};
pub use sources::{GeoLookup, HttpGeoLookup, HttpRateSource, RateSource};

use crate::core::Config;
use crate::pricing::to_decimal;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::Lookup;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Country assumed when the caller's address is unknown or the lookup fails
pub const DEFAULT_COUNTRY: &str = "US";
/// Country assumed for loopback and private-network callers
pub const LOCAL_COUNTRY: &str = "KG";

const GEO_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const GEO_FAILURE_TTL: Duration = Duration::from_secs(60 * 60);
const RATES_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const RATES_FAILURE_TTL: Duration = Duration::from_secs(60 * 60);
const RATES_KEY: &str = "USD";

pub type RateTable = HashMap<Currency, Decimal>;

/// Where a shopper is and how their prices are shown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopperLocale {
    pub country: String,
    pub currency: Currency,
    pub symbol: &'static str,
    /// Units of `currency` per USD
    #[serde(skip)]
    pub rate: Decimal,
    /// A remote lookup failed and a default was used
    pub degraded: bool,
}

impl ShopperLocale {
    pub fn new(country: impl Into<String>, currency: Currency, rate: Decimal, degraded: bool) -> Self {
        Self {
            country: country.into(),
            currency,
            symbol: currency.symbol(),
            rate,
            degraded,
        }
    }

    /// Plain USD display, no conversion
    pub fn usd() -> Self {
        Self::new(DEFAULT_COUNTRY, Currency::Usd, Decimal::ONE, false)
    }

    pub fn price(&self, usd_amount: f64) -> LocalPrice {
        let amount = convert_price(to_decimal(usd_amount), self.rate);
        LocalPrice {
            amount,
            currency: self.currency,
            display: format_price(amount, self.currency),
        }
    }
}

/// Converted price ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalPrice {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    pub display: String,
}

fn fallback_rates() -> RateTable {
    Currency::ALL.into_iter().map(|c| (c, c.fallback_rate())).collect()
}

/// Loopback, RFC 1918 and link-local v4, loopback and unique-local v6
pub fn is_local_address(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback() || v4.is_private())
        }
    }
}

#[derive(Clone)]
pub struct LocaleService {
    geo: Arc<dyn GeoLookup>,
    rates: Arc<dyn RateSource>,
    geo_timeout: Duration,
    rates_timeout: Duration,
    countries: Arc<TtlCache<IpAddr, Lookup<String>>>,
    rate_tables: Arc<TtlCache<&'static str, Lookup<RateTable>>>,
}

impl std::fmt::Debug for LocaleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleService")
            .field("geo_timeout", &self.geo_timeout)
            .field("rates_timeout", &self.rates_timeout)
            .field("cached_countries", &self.countries.len())
            .finish()
    }
}

impl LocaleService {
    pub fn new(
        geo: Arc<dyn GeoLookup>,
        rates: Arc<dyn RateSource>,
        geo_timeout: Duration,
        rates_timeout: Duration,
    ) -> Self {
        Self {
            geo,
            rates,
            geo_timeout,
            rates_timeout,
            countries: Arc::new(TtlCache::new()),
            rate_tables: Arc::new(TtlCache::new()),
        }
    }

    /// HTTP-backed service configured from the environment
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let geo_timeout = Duration::from_millis(config.geo_timeout_ms);
        let rates_timeout = Duration::from_millis(config.external_timeout_ms);
        Ok(Self::new(
            Arc::new(HttpGeoLookup::new(&config.geo_api_url, geo_timeout)?),
            Arc::new(HttpRateSource::new(&config.rates_api_url, rates_timeout)?),
            geo_timeout,
            rates_timeout,
        ))
    }

    /// Country for a caller address
    pub async fn country_for(&self, ip: Option<IpAddr>) -> Lookup<String> {
        let Some(ip) = ip else {
            return Lookup::Fresh(DEFAULT_COUNTRY.to_string());
        };
        if is_local_address(&ip) {
            return Lookup::Fresh(LOCAL_COUNTRY.to_string());
        }
        if let Some(hit) = self.countries.get(&ip) {
            return hit;
        }

        let result = match tokio::time::timeout(self.geo_timeout, self.geo.country(ip)).await {
            Ok(Ok(country)) => {
                let found = Lookup::Fresh(country);
                self.countries.insert(ip, found.clone(), GEO_TTL);
                return found;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => "timed out".to_string(),
        };
        tracing::warn!(ip = %ip, error = %result, "Geo lookup failed, using default country");
        let fallback = Lookup::Degraded(DEFAULT_COUNTRY.to_string());
        self.countries.insert(ip, fallback.clone(), GEO_FAILURE_TTL);
        fallback
    }

    /// Current USD-based rate table
    pub async fn rates(&self) -> Lookup<RateTable> {
        if let Some(hit) = self.rate_tables.get(&RATES_KEY) {
            return hit;
        }

        let error = match tokio::time::timeout(self.rates_timeout, self.rates.latest()).await {
            Ok(Ok(remote)) => {
                let mut table = fallback_rates();
                for currency in [Currency::Kgs, Currency::Kzt] {
                    if let Some(rate) = remote.get(currency.code()) {
                        table.insert(currency, *rate);
                    }
                }
                let fresh = Lookup::Fresh(table);
                self.rate_tables.insert(RATES_KEY, fresh.clone(), RATES_TTL);
                return fresh;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => "timed out".to_string(),
        };
        tracing::warn!(error = %error, "Exchange rate fetch failed, using fallback rates");
        let fallback = Lookup::Degraded(fallback_rates());
        self.rate_tables.insert(RATES_KEY, fallback.clone(), RATES_FAILURE_TTL);
        fallback
    }

    pub async fn rate(&self, currency: Currency) -> Lookup<Decimal> {
        if currency == Currency::Usd {
            return Lookup::Fresh(Decimal::ONE);
        }
        self.rates()
            .await
            .map(|table| table.get(&currency).copied().unwrap_or(Decimal::ONE))
    }

    /// Resolve the display locale for a caller; an explicit currency wins
    /// over the one implied by the country
    pub async fn resolve(&self, ip: Option<IpAddr>, preferred: Option<Currency>) -> ShopperLocale {
        let country = self.country_for(ip).await;
        let currency = preferred.unwrap_or_else(|| Currency::for_country(country.value()));
        let rate = self.rate(currency).await;
        let degraded = country.is_degraded() || rate.is_degraded();
        ShopperLocale::new(country.into_value(), currency, rate.into_value(), degraded)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Offline collaborators for locale-dependent tests

    use super::*;
    use async_trait::async_trait;

    pub struct FixedGeo(pub Option<&'static str>);

    #[async_trait]
    impl GeoLookup for FixedGeo {
        async fn country(&self, _ip: IpAddr) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("geo offline"))
        }
    }

    pub struct FixedRates(pub Option<HashMap<String, Decimal>>);

    #[async_trait]
    impl RateSource for FixedRates {
        async fn latest(&self) -> anyhow::Result<HashMap<String, Decimal>> {
            self.0.clone().ok_or_else(|| anyhow::anyhow!("rates offline"))
        }
    }

    pub fn offline() -> LocaleService {
        LocaleService::new(
            Arc::new(FixedGeo(None)),
            Arc::new(FixedRates(None)),
            Duration::from_millis(50),
            Duration::from_millis(50),
        )
    }
}
