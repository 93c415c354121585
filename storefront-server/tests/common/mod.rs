//! Shared fixture: a seeded shop with fake collaborators, no network

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use storefront_server::core::state::Collaborators;
use sqlx::SqlitePool;
use storefront_server::db::DbService;
use storefront_server::locale::{GeoLookup, LocaleService, RateSource};
use storefront_server::notify::{Mail, Mailer};
use storefront_server::payments::gateway::reference_matches;
use storefront_server::payments::{GatewayRegistry, Payload, PaymentGateway, PaymentVerdict};
use storefront_server::pricing::StaticTaxTable;
use storefront_server::{AppResult, Config, ServerState};
use shared::models::{Order, PaymentMethod};

pub const CUSTOMER: i64 = 1;

/// Every lookup fails, so callers get the fallback country and rates
pub struct OfflineGeo;

#[async_trait]
impl GeoLookup for OfflineGeo {
    async fn country(&self, _ip: IpAddr) -> anyhow::Result<String> {
        anyhow::bail!("offline")
    }
}

pub struct OfflineRates;

#[async_trait]
impl RateSource for OfflineRates {
    async fn latest(&self) -> anyhow::Result<HashMap<String, Decimal>> {
        anyhow::bail!("offline")
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Mail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        self.sent.lock().push(mail.clone());
        Ok(())
    }
}

/// Paystack stand-in: a payment is good when it carries the reference handed
/// out when it was started for that order
pub struct FakePaystack;

#[async_trait]
impl PaymentGateway for FakePaystack {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Paystack
    }

    async fn verify(&self, order: &Order, payload: &Payload) -> AppResult<PaymentVerdict> {
        let reference = payload.get("reference").cloned().unwrap_or_default();
        let paid = reference_matches(order, PaymentMethod::Paystack, &reference);
        Ok(PaymentVerdict::new(order, PaymentMethod::Paystack, paid, Some(reference)))
    }
}

pub struct Shop {
    pub state: ServerState,
    pub mailer: Arc<RecordingMailer>,
    pub shirts: i64,
    pub shirt: i64,
    pub socks: i64,
    pub north: i64,
    pub south: i64,
    pub address: i64,
    _dir: tempfile::TempDir,
}

/// Rows the back-office would have written; ids are fixed
async fn insert(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql).execute(pool).await.unwrap();
}

/// Two vendors, a "Shirts" category, a shirt (10.00 + 1.00 shipping, sizes
/// M/L) from North and socks (5.00 + 0.50) from South, customer 1 living
/// in KG with 10% tax, and North's 10% coupon "TEN"
pub async fn shop() -> Shop {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let pool = DbService::open_in_memory().await.unwrap().pool;

    let (north, south, shirts, shirt, socks, address) = (11, 12, 21, 31, 32, 41);
    let now = shared::util::now_millis();
    insert(&pool, "INSERT INTO vendor (id, name, email) VALUES (11, 'North', 'north@shop.test'), (12, 'South', 'south@shop.test')").await;
    insert(&pool, "INSERT INTO category (id, title, slug) VALUES (21, 'Shirts', 'shirts')").await;
    insert(
        &pool,
        &format!(
            "INSERT INTO product (id, vendor_id, category_id, name, slug, brand, price, shipping, stock, created_at) VALUES \
             (31, 11, 21, 'Linen Shirt', 'linen-shirt', 'Acme', 10.0, 1.0, 10, {now}), \
             (32, 12, NULL, 'Wool Socks', 'wool-socks', 'Knit', 5.0, 0.5, 10, {now})"
        ),
    )
    .await;
    insert(
        &pool,
        "INSERT INTO product_variant (id, product_id, size, color, stock, is_available) VALUES \
         (51, 31, 'M', 'White', 5, 1), (52, 31, 'L', 'White', 5, 1)",
    )
    .await;
    insert(&pool, "INSERT INTO address (id, user_id, full_name, email, country) VALUES (41, 1, 'Aida Buyer', 'buyer@shop.test', 'KG')").await;
    insert(&pool, "INSERT INTO coupon (id, vendor_id, code, discount) VALUES (61, 11, 'TEN', 10)").await;

    let mut registry = GatewayRegistry::new();
    registry.register(Arc::new(FakePaystack));
    let mailer = Arc::new(RecordingMailer::default());
    let collaborators = Collaborators {
        tax: Arc::new(StaticTaxTable::new(
            HashMap::from([("KG".to_string(), Decimal::from(10))]),
            Decimal::ZERO,
        )),
        locale: LocaleService::new(
            Arc::new(OfflineGeo),
            Arc::new(OfflineRates),
            Duration::from_millis(50),
            Duration::from_millis(50),
        ),
        gateways: registry,
        mailer: mailer.clone(),
    };

    let state = ServerState::new(config, pool, collaborators);
    state.catalog.warmup().await.unwrap();

    Shop {
        state,
        mailer,
        shirts,
        shirt,
        socks,
        north,
        south,
        address,
        _dir: dir,
    }
}

pub fn payload(reference: &str) -> Payload {
    Payload::from([("reference".to_string(), reference.to_string())])
}
