use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::cart::CartService;
use crate::catalog::CatalogService;
use crate::checkout::CheckoutService;
use crate::core::{Config, Result, ServerError};
use crate::coupons::CouponService;
use crate::db::DbService;
use crate::locale::LocaleService;
use crate::notify::{LogMailer, Mailer, NotificationService, RelayMailer};
use crate::payments::{GatewayRegistry, PaymentService};
use crate::pricing::{ServiceFee, StaticTaxTable, TaxProvider};

/// External collaborators the services are built on
///
/// Production wiring comes from [`Collaborators::from_config`]; tests swap in
/// fakes.
pub struct Collaborators {
    pub tax: Arc<dyn TaxProvider>,
    pub locale: LocaleService,
    pub gateways: GatewayRegistry,
    pub mailer: Arc<dyn Mailer>,
}

impl Collaborators {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let external_timeout = Duration::from_millis(config.external_timeout_ms);
        let mailer: Arc<dyn Mailer> = match &config.mail_relay_url {
            Some(url) => Arc::new(RelayMailer::new(url.clone(), external_timeout)?),
            None => Arc::new(LogMailer),
        };
        Ok(Self {
            tax: Arc::new(StaticTaxTable::new(
                config.tax_rates.clone(),
                config.default_tax_rate,
            )),
            locale: LocaleService::from_config(config)?,
            gateways: GatewayRegistry::from_credentials(&config.gateways, external_timeout)?,
            mailer,
        })
    }
}

/// Server state - shared handles on every service
///
/// Cloning is cheap: every service holds a pool handle and `Arc`s.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | immutable configuration |
/// | pool | SQLite pool |
/// | catalog | in-memory catalog snapshot (facet search) |
/// | carts | Cart Aggregator |
/// | checkout | Order Finalizer |
/// | coupons | Coupon Engine |
/// | payments | Payment Reconciler |
/// | notifications | order notifications and mail |
/// | locale | shopper country and currency |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub catalog: CatalogService,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub coupons: CouponService,
    pub payments: PaymentService,
    pub notifications: NotificationService,
    pub locale: LocaleService,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, collaborators: Collaborators) -> Self {
        let external_timeout = Duration::from_millis(config.external_timeout_ms);
        let notifications = NotificationService::new(
            pool.clone(),
            collaborators.mailer,
            config.mail_from.clone(),
        );
        let payments = PaymentService::new(
            pool.clone(),
            Arc::new(collaborators.gateways),
            notifications.clone(),
            // PayPal needs a token call before the lookup
            external_timeout * 2,
            config.public_base_url.clone(),
        );
        let checkout = CheckoutService::new(
            pool.clone(),
            collaborators.tax,
            ServiceFee::new(config.service_fee_percent, config.service_fee_fixed),
            external_timeout,
        );

        Self {
            catalog: CatalogService::with_max_age(
                pool.clone(),
                Duration::from_millis(config.catalog_max_age_ms),
            ),
            carts: CartService::new(pool.clone()),
            coupons: CouponService::new(pool.clone()),
            checkout,
            payments,
            notifications,
            locale: collaborators.locale,
            pool,
            config,
        }
    }

    /// Open the database, wire the collaborators and load the catalog
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| ServerError::Config(format!("cannot create {}: {e}", config.work_dir)))?;

        let db = DbService::new(&config.database_path).await?;
        let collaborators =
            Collaborators::from_config(config).map_err(|e| ServerError::Config(e.to_string()))?;

        let state = Self::new(config.clone(), db.pool, collaborators);
        state
            .catalog
            .warmup()
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        Ok(state)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
