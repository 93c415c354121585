//! Tax rate lookup
//!
//! A [`TaxProvider`] answers "which percent applies in this country". Callers
//! go through [`bounded_tax_rate`], which caps the call with a timeout and
//! falls back to the default rate as [`Lookup::Degraded`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::Lookup;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait]
pub trait TaxProvider: Send + Sync {
    /// Tax percent for an ISO country code
    async fn rate(&self, country: &str) -> Lookup<Decimal>;

    /// Rate used when the provider cannot answer
    fn default_rate(&self) -> Decimal;
}

/// Country → percent table loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTaxTable {
    rates: HashMap<String, Decimal>,
    default_rate: Decimal,
}

impl StaticTaxTable {
    pub fn new(rates: HashMap<String, Decimal>, default_rate: Decimal) -> Self {
        Self { rates, default_rate }
    }
}

#[async_trait]
impl TaxProvider for StaticTaxTable {
    async fn rate(&self, country: &str) -> Lookup<Decimal> {
        let key = country.trim().to_ascii_uppercase();
        Lookup::Fresh(self.rates.get(&key).copied().unwrap_or(self.default_rate))
    }

    fn default_rate(&self) -> Decimal {
        self.default_rate
    }
}

/// Ask the provider, but never wait longer than `timeout`
pub async fn bounded_tax_rate(
    provider: &dyn TaxProvider,
    country: &str,
    timeout: Duration,
) -> Lookup<Decimal> {
    match tokio::time::timeout(timeout, provider.rate(country)).await {
        Ok(lookup) => lookup,
        Err(_) => {
            tracing::warn!(country = %country, timeout_ms = timeout.as_millis() as u64, "Tax lookup timed out, using default rate");
            Lookup::Degraded(provider.default_rate())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowProvider;

    #[async_trait]
    impl TaxProvider for SlowProvider {
        async fn rate(&self, _country: &str) -> Lookup<Decimal> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Lookup::Fresh(Decimal::from(50))
        }

        fn default_rate(&self) -> Decimal {
            Decimal::from(3)
        }
    }

    #[tokio::test]
    async fn test_static_table() {
        let table = StaticTaxTable::new(
            HashMap::from([("US".to_string(), Decimal::new(75, 1))]),
            Decimal::ONE,
        );
        assert_eq!(table.rate("us").await, Lookup::Fresh(Decimal::new(75, 1)));
        assert_eq!(table.rate("FR").await, Lookup::Fresh(Decimal::ONE));
    }

    #[tokio::test]
    async fn test_slow_provider_degrades() {
        let lookup = bounded_tax_rate(&SlowProvider, "US", Duration::from_millis(50)).await;
        assert_eq!(lookup, Lookup::Degraded(Decimal::from(3)));
    }
}
