//! # stockmark-db
//!
//! PostgreSQL database layer for stockmark.
//!
//! This crate provides:
//! - Connection pool management
//! - Idempotent schema bootstrap
//! - The transaction-scoped tag resolver
//! - Repository implementations for stocks and tags
//!
//! ## Example
//!
//! ```rust,ignore
//! use stockmark_db::{CreateStockRequest, Database, StockRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/stocktracker").await?;
//!     db.ensure_schema().await?;
//!
//!     let stock = db.stocks.create(CreateStockRequest {
//!         symbol: "AAPL".to_string(),
//!         notes: None,
//!         watchlist: true,
//!         tags: vec!["tech".to_string(), "growth".to_string()],
//!     }).await?;
//!
//!     println!("Created stock {} with tags {:?}", stock.id, stock.tag_names());
//!     Ok(())
//! }
//! ```
pub mod pool;
pub mod schema;
pub mod stocks;
pub mod tags;

// Test fixtures for integration tests
// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use stockmark_core::*;

pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schema::ensure_schema;
pub use stocks::PgStockRepository;
pub use tags::{fetch_tags_for_stock, link_tag_tx, resolve_tag_tx, PgTagRepository};

/// Combined database context with all repositories.
///
/// Cloning is cheap: the pool is reference-counted and the repositories only
/// hold pool handles.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Stock repository, including the stock-tag transactions.
    pub stocks: PgStockRepository,
    /// Tag repository.
    pub tags: PgTagRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            stocks: PgStockRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Create the service tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        ensure_schema(&self.pool).await
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
