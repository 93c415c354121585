//! Remote collaborators behind the locale service

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// IP → ISO country code
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn country(&self, ip: IpAddr) -> anyhow::Result<String>;
}

/// Latest USD-based exchange rates keyed by currency code
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn latest(&self) -> anyhow::Result<HashMap<String, Decimal>>;
}

/// ip-api.com style endpoint: `GET {base}/{ip}?fields=countryCode`
pub struct HttpGeoLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeoLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storefront-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build geo lookup client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoResponse {
    country_code: Option<String>,
}

#[async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn country(&self, ip: IpAddr) -> anyhow::Result<String> {
        let resp = self
            .client
            .get(format!("{}/{}", self.base_url, ip))
            .query(&[("fields", "countryCode")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("geo lookup returned {}", resp.status()));
        }
        let body: GeoResponse = resp.json().await?;
        body.country_code
            .filter(|c| !c.is_empty())
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| anyhow!("geo lookup answered without a country code"))
    }
}

/// exchangerate-api.com style endpoint: `{"rates": {"KGS": 87.3, ...}}`
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build exchange rate client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[derive(Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: HashMap<String, serde_json::Number>,
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn latest(&self) -> anyhow::Result<HashMap<String, Decimal>> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("rates endpoint returned {}", resp.status()));
        }
        let body: RatesResponse = resp.json().await?;
        Ok(parse_rates(body.rates))
    }
}

/// Numbers go through their decimal text so `87.3` stays `87.3`
fn parse_rates(raw: HashMap<String, serde_json::Number>) -> HashMap<String, Decimal> {
    raw.into_iter()
        .filter_map(|(code, n)| {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .filter(|rate| *rate > Decimal::ZERO)
                .map(|rate| (code.to_ascii_uppercase(), rate))
        })
        .collect()
}
