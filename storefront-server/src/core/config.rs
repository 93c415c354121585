use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Storefront server configuration
///
/// # Environment
///
/// Every field can be overridden through the environment (a `.env` file is
/// read first):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | data and log root |
/// | DATABASE_PATH | {WORK_DIR}/storefront.db | SQLite file |
/// | HTTP_PORT | 8000 | HTTP port |
/// | ENVIRONMENT | development | development / production |
/// | LOG_LEVEL | info | default log filter |
/// | LOG_JSON | false (true in production) | JSON console logs |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | EXTERNAL_TIMEOUT_MS | 1000 | tax / rates / gateway call bound |
/// | GEO_TIMEOUT_MS | 500 | IP geolocation bound |
/// | CATALOG_MAX_AGE_MS | 30000 | catalog snapshot age before it is rebuilt |
/// | GEO_API_URL | http://ip-api.com/json | geolocation endpoint |
/// | RATES_API_URL | https://api.exchangerate-api.com/v4/latest/USD | exchange rates |
/// | TAX_RATES | (empty) | `CC:percent` list, e.g. `US:7.5,KG:12` |
/// | DEFAULT_TAX_RATE | 0 | percent for countries without an entry |
/// | SERVICE_FEE_PERCENT | 0 | service fee, percent of the order total |
/// | SERVICE_FEE_FIXED | 0 | flat service fee |
/// | PUBLIC_BASE_URL | http://localhost:8000 | base for gateway redirects |
/// | MAIL_RELAY_URL | (unset) | JSON mail relay; mail is logged when unset |
/// | MAIL_FROM | shop@localhost | sender address |
///
/// Gateway credentials (`STRIPE_SECRET_KEY`, `PAYPAL_CLIENT_ID`,
/// `PAYPAL_SECRET_ID`, `PAYPAL_API_URL`, `RAZORPAY_KEY_ID`,
/// `RAZORPAY_KEY_SECRET`, `PAYSTACK_SECRET_KEY`, `FLUTTERWAVE_SECRET_KEY`) are
/// optional; a gateway without credentials is not registered.
///
/// ```ignore
/// WORK_DIR=/data/shop HTTP_PORT=8080 TAX_RATES="US:7.5" cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Data and log root
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    /// development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub request_timeout_ms: u64,
    /// Upper bound for tax, exchange-rate and payment gateway calls
    pub external_timeout_ms: u64,
    pub geo_timeout_ms: u64,
    /// Catalog writes come from the back-office; the snapshot is rebuilt after this long
    pub catalog_max_age_ms: u64,
    pub geo_api_url: String,
    pub rates_api_url: String,
    /// Country code → tax percent
    pub tax_rates: HashMap<String, Decimal>,
    pub default_tax_rate: Decimal,
    pub service_fee_percent: Decimal,
    pub service_fee_fixed: Decimal,
    pub public_base_url: String,
    pub gateways: GatewayCredentials,
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
}

/// Payment gateway credentials, each optional
#[derive(Debug, Clone, Default)]
pub struct GatewayCredentials {
    pub stripe_secret_key: Option<String>,
    pub paypal_client_id: Option<String>,
    pub paypal_secret_id: Option<String>,
    pub paypal_api_url: String,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub paystack_secret_key: Option<String>,
    pub flutterwave_secret_key: Option<String>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse `US:7.5,KG:12`; malformed entries are skipped
pub fn parse_tax_rates(raw: &str) -> HashMap<String, Decimal> {
    raw.split(',')
        .filter_map(|entry| {
            let (country, rate) = entry.split_once(':')?;
            let country = country.trim().to_ascii_uppercase();
            let rate = Decimal::from_str(rate.trim()).ok()?;
            (!country.is_empty() && rate >= Decimal::ZERO).then_some((country, rate))
        })
        .collect()
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let production = environment == "production";

        Self {
            database_path: env_opt("DATABASE_PATH")
                .unwrap_or_else(|| format!("{work_dir}/storefront.db")),
            work_dir,
            http_port: env_parse("HTTP_PORT", 8000),
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", production),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            external_timeout_ms: env_parse("EXTERNAL_TIMEOUT_MS", 1000),
            geo_timeout_ms: env_parse("GEO_TIMEOUT_MS", 500),
            catalog_max_age_ms: env_parse("CATALOG_MAX_AGE_MS", 30000),
            geo_api_url: std::env::var("GEO_API_URL")
                .unwrap_or_else(|_| "http://ip-api.com/json".into()),
            rates_api_url: std::env::var("RATES_API_URL")
                .unwrap_or_else(|_| "https://api.exchangerate-api.com/v4/latest/USD".into()),
            tax_rates: parse_tax_rates(&std::env::var("TAX_RATES").unwrap_or_default()),
            default_tax_rate: env_parse("DEFAULT_TAX_RATE", Decimal::ZERO),
            service_fee_percent: env_parse("SERVICE_FEE_PERCENT", Decimal::ZERO),
            service_fee_fixed: env_parse("SERVICE_FEE_FIXED", Decimal::ZERO),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            gateways: GatewayCredentials {
                stripe_secret_key: env_opt("STRIPE_SECRET_KEY"),
                paypal_client_id: env_opt("PAYPAL_CLIENT_ID"),
                paypal_secret_id: env_opt("PAYPAL_SECRET_ID"),
                paypal_api_url: std::env::var("PAYPAL_API_URL")
                    .unwrap_or_else(|_| "https://api-m.sandbox.paypal.com".into()),
                razorpay_key_id: env_opt("RAZORPAY_KEY_ID"),
                razorpay_key_secret: env_opt("RAZORPAY_KEY_SECRET"),
                paystack_secret_key: env_opt("PAYSTACK_SECRET_KEY"),
                flutterwave_secret_key: env_opt("FLUTTERWAVE_SECRET_KEY"),
            },
            mail_relay_url: env_opt("MAIL_RELAY_URL"),
            mail_from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "shop@localhost".into()),
        }
    }

    /// Override the locations, keeping everything else from the environment
    ///
    /// Mostly used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = format!("{}/storefront.db", config.work_dir);
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Directory for rolling log files
    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
