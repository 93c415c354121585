//! Catalog Service - in-memory snapshot of the shopper-visible catalog
//!
//! Facet resolution runs entirely against this snapshot. `warmup()` loads it
//! at startup. Catalog writes happen outside this process, so `current()`
//! rebuilds a snapshot older than `max_age` before handing it out. Readers
//! hold an `Arc` to the snapshot they started with, so a refresh never
//! changes the data under a running request.

use crate::db::repository::{RepoResult, category, product, review, variant};
use parking_lot::RwLock;
use shared::models::{Category, Product, ProductOption, ProductVariant, ReviewStats};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default age after which the snapshot is rebuilt on read
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30);

/// Option group names that feed the size/colour facet lists
pub const OPTION_GROUP_SIZE: &str = "Size";
pub const OPTION_GROUP_COLOR: &str = "Color";

/// Published product with everything facet resolution needs
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub product: Product,
    pub category_title: Option<String>,
    pub variants: Vec<ProductVariant>,
    pub options: Vec<ProductOption>,
    pub reviews: ReviewStats,
}

impl CatalogEntry {
    pub fn id(&self) -> i64 {
        self.product.id
    }

    fn available_variants(&self) -> impl Iterator<Item = &ProductVariant> {
        self.variants.iter().filter(|v| v.is_available)
    }

    /// Sizes offered through available variants
    pub fn available_sizes(&self) -> impl Iterator<Item = &str> {
        self.available_variants()
            .filter_map(|v| v.size.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Colours offered through available variants, with their hex code
    pub fn available_colors(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.available_variants()
            .filter_map(|v| v.color.as_deref().map(|c| (c, v.color_code.as_deref())))
            .filter(|(c, _)| !c.is_empty())
    }

    pub fn offers_size(&self, size: &str) -> bool {
        self.available_sizes().any(|s| s == size)
    }

    pub fn offers_color(&self, color: &str) -> bool {
        self.available_colors().any(|(c, _)| c == color)
    }

    /// Option item values of one group ("Size", "Color")
    pub fn option_values<'a>(&'a self, group: &'a str) -> impl Iterator<Item = (&'a str, &'a ProductOption)> {
        self.options
            .iter()
            .filter(move |o| o.name == group)
            .filter_map(|o| o.value().map(|v| (v, o)))
    }
}

/// Immutable view of the catalog
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    /// Published products, newest first
    pub products: Vec<CatalogEntry>,
    /// Every category, ordered by title
    pub categories: Vec<Category>,
    /// Category id → number of published products
    pub category_counts: HashMap<i64, i64>,
    pub loaded_at: i64,
}

impl CatalogSnapshot {
    /// Assemble a snapshot from rows; non-published products are dropped
    pub fn build(
        products: Vec<Product>,
        mut categories: Vec<Category>,
        variants: Vec<ProductVariant>,
        options: Vec<ProductOption>,
        stats: Vec<ReviewStats>,
    ) -> Self {
        categories.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        let titles: HashMap<i64, &str> =
            categories.iter().map(|c| (c.id, c.title.as_str())).collect();

        let mut variants_by_product: HashMap<i64, Vec<ProductVariant>> = HashMap::new();
        for v in variants {
            variants_by_product.entry(v.product_id).or_default().push(v);
        }
        let mut options_by_product: HashMap<i64, Vec<ProductOption>> = HashMap::new();
        for o in options {
            options_by_product.entry(o.product_id).or_default().push(o);
        }
        let stats_by_product: HashMap<i64, ReviewStats> =
            stats.into_iter().map(|s| (s.product_id, s)).collect();

        let mut category_counts: HashMap<i64, i64> = HashMap::new();
        let mut entries: Vec<CatalogEntry> = products
            .into_iter()
            .filter(Product::is_published)
            .map(|product| {
                let id = product.id;
                if let Some(category_id) = product.category_id {
                    *category_counts.entry(category_id).or_default() += 1;
                }
                CatalogEntry {
                    category_title: product
                        .category_id
                        .and_then(|c| titles.get(&c))
                        .map(|t| t.to_string()),
                    variants: variants_by_product.remove(&id).unwrap_or_default(),
                    options: options_by_product.remove(&id).unwrap_or_default(),
                    reviews: stats_by_product.get(&id).copied().unwrap_or(ReviewStats {
                        product_id: id,
                        ..Default::default()
                    }),
                    product,
                }
            })
            .collect();
        entries.sort_by(|a, b| {
            b.product
                .created_at
                .cmp(&a.product.created_at)
                .then(b.id().cmp(&a.id()))
        });

        Self {
            products: entries,
            categories,
            category_counts,
            loaded_at: shared::util::now_millis(),
        }
    }

    /// Whether the snapshot was loaded more than `max_age` ago
    pub fn is_stale(&self, max_age: Duration) -> bool {
        let age = shared::util::now_millis().saturating_sub(self.loaded_at);
        age < 0 || age as u128 >= max_age.as_millis()
    }

    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn product(&self, id: i64) -> Option<&CatalogEntry> {
        self.products.iter().find(|e| e.id() == id)
    }

    /// Published products, optionally narrowed to one category
    pub fn base(&self, category_id: Option<i64>) -> impl Iterator<Item = &CatalogEntry> {
        self.products
            .iter()
            .filter(move |e| category_id.is_none() || e.product.category_id == category_id)
    }
}

/// Shared handle on the current catalog snapshot
#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    snapshot: Arc<RwLock<Arc<CatalogSnapshot>>>,
    /// Single rebuild at a time; late readers reuse its result
    rebuild: Arc<tokio::sync::Mutex<()>>,
    max_age: Duration,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("CatalogService")
            .field("products_count", &snapshot.products.len())
            .field("categories_count", &snapshot.categories.len())
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl CatalogService {
    /// Empty service; call [`warmup`](Self::warmup) before serving
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_max_age(pool, DEFAULT_MAX_AGE)
    }

    pub fn with_max_age(pool: SqlitePool, max_age: Duration) -> Self {
        Self {
            pool,
            snapshot: Arc::new(RwLock::new(Arc::new(CatalogSnapshot::default()))),
            rebuild: Arc::new(tokio::sync::Mutex::new(())),
            max_age,
        }
    }

    /// Load the catalog from the database
    pub async fn warmup(&self) -> RepoResult<()> {
        let categories = category::find_all(&self.pool).await?;
        let products = product::find_published(&self.pool).await?;
        let variants = variant::find_for_published(&self.pool).await?;
        let options = variant::find_options_for_published(&self.pool).await?;
        let stats = review::stats_all(&self.pool).await?;

        let snapshot = CatalogSnapshot::build(products, categories, variants, options, stats);
        tracing::info!(
            products = snapshot.products.len(),
            categories = snapshot.categories.len(),
            "CatalogService: snapshot loaded"
        );
        *self.snapshot.write() = Arc::new(snapshot);
        Ok(())
    }

    /// Rebuild the snapshot after catalog changes
    pub async fn refresh(&self) -> RepoResult<()> {
        self.warmup().await
    }

    /// Snapshot as last loaded, without checking its age
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().clone()
    }

    /// Snapshot no older than `max_age`, rebuilt from the database if needed
    pub async fn current(&self) -> RepoResult<Arc<CatalogSnapshot>> {
        let snapshot = self.snapshot();
        if !snapshot.is_stale(self.max_age) {
            return Ok(snapshot);
        }

        let _guard = self.rebuild.lock().await;
        // another reader may have rebuilt while we waited
        let snapshot = self.snapshot();
        if !snapshot.is_stale(self.max_age) {
            return Ok(snapshot);
        }
        tracing::debug!(loaded_at = snapshot.loaded_at, "CatalogService: snapshot expired");
        self.warmup().await?;
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;

    #[tokio::test]
    async fn test_warmup_groups_rows_per_product() {
        let pool = testing::pool().await;
        let shoes = testing::category(&pool, "Shoes").await;
        let mut data = testing::product_data("Runner", 50.0);
        data.category_id = Some(shoes);
        let runner = testing::product(&pool, data).await;
        testing::variant(&pool, runner, "42", "Black", true).await;
        testing::variant(&pool, runner, "43", "White", false).await;
        review::create(&pool, runner, None, 4, None).await.unwrap();

        let service = CatalogService::new(pool);
        assert!(service.snapshot().products.is_empty());
        service.warmup().await.unwrap();

        let snapshot = service.snapshot();
        let entry = snapshot.product(runner).unwrap();
        assert_eq!(entry.category_title.as_deref(), Some("Shoes"));
        assert_eq!(entry.available_sizes().collect::<Vec<_>>(), vec!["42"]);
        assert!(entry.offers_color("Black"));
        assert!(!entry.offers_color("White"));
        assert_eq!(entry.reviews.review_count, 1);
        assert_eq!(snapshot.category_counts.get(&shoes), Some(&1));
    }

    #[tokio::test]
    async fn test_refresh_publishes_new_snapshot() {
        let pool = testing::pool().await;
        let service = CatalogService::new(pool.clone());
        service.warmup().await.unwrap();
        let before = service.snapshot();

        testing::product(&pool, testing::product_data("Late", 1.0)).await;
        service.refresh().await.unwrap();

        assert!(before.products.is_empty());
        assert_eq!(service.snapshot().products.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_product_drops_out_once_snapshot_expires() {
        let pool = testing::pool().await;
        let shirt = testing::product(&pool, testing::product_data("Shirt", 10.0)).await;
        let service = CatalogService::with_max_age(pool.clone(), Duration::from_millis(50));
        service.warmup().await.unwrap();
        assert!(service.current().await.unwrap().product(shirt).is_some());

        sqlx::query("UPDATE product SET status = 'disabled' WHERE id = ?")
            .bind(shirt)
            .execute(&pool)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;

        let snapshot = service.current().await.unwrap();
        assert!(snapshot.product(shirt).is_none());
        assert!(snapshot.products.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_snapshot_is_reused() {
        let pool = testing::pool().await;
        let service = CatalogService::with_max_age(pool.clone(), Duration::from_secs(60));
        service.warmup().await.unwrap();
        let first = service.current().await.unwrap();

        testing::product(&pool, testing::product_data("Late", 1.0)).await;
        let second = service.current().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_default_snapshot_is_stale() {
        assert!(CatalogSnapshot::default().is_stale(DEFAULT_MAX_AGE));
    }
}
