//! Stock repository implementation.
//!
//! Creates and updates are single transactions covering the stock row, tag
//! resolution and the full replacement of the stock's `stock_tags` rows. A
//! transaction that is dropped before `commit` is rolled back by sqlx, so
//! every early `?` return leaves the persisted state untouched.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use tracing::{debug, info};

use stockmark_core::{
    CreateStockRequest, Error, Result, Stock, StockRepository, UpdateStockRequest,
};

use crate::tags::{fetch_tags_for_stock, link_tag_tx, resolve_tag_tx};

/// Columns selected for a stock row, in `Stock` field order.
pub(crate) const STOCK_COLUMNS: &str = "id, symbol, notes, watchlist, created_at, updated_at";

/// PostgreSQL implementation of StockRepository.
#[derive(Clone)]
pub struct PgStockRepository {
    pool: Pool<Postgres>,
}

impl PgStockRepository {
    /// Create a new PgStockRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a stock and its tag associations within a transaction.
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: CreateStockRequest,
    ) -> Result<Stock> {
        let query = format!(
            "INSERT INTO stocks (symbol, notes, watchlist) VALUES ($1, $2, $3) RETURNING {}",
            STOCK_COLUMNS
        );
        let mut stock = sqlx::query_as::<_, Stock>(&query)
            .bind(&req.symbol)
            .bind(&req.notes)
            .bind(req.watchlist)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;

        attach_tags_tx(tx, stock.id, &req.tags).await?;
        stock.tags = fetch_tags_for_stock(&mut **tx, stock.id).await?;
        Ok(stock)
    }

    /// Replace a stock's fields and its whole tag set within a transaction.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        req: UpdateStockRequest,
    ) -> Result<Stock> {
        let query = format!(
            "UPDATE stocks SET symbol = $1, notes = $2, watchlist = $3, updated_at = NOW()
             WHERE id = $4
             RETURNING {}",
            STOCK_COLUMNS
        );
        let mut stock = sqlx::query_as::<_, Stock>(&query)
            .bind(&req.symbol)
            .bind(&req.notes)
            .bind(req.watchlist)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::StockNotFound(id))?;

        // Full replace: drop every association, then attach the new set.
        sqlx::query("DELETE FROM stock_tags WHERE stock_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        attach_tags_tx(tx, id, &req.tags).await?;
        stock.tags = fetch_tags_for_stock(&mut **tx, id).await?;
        Ok(stock)
    }
}

/// Resolve each distinct name and link it to the stock.
///
/// Names are resolved in sorted order so that writers sharing new tag names
/// wait on each other's uncommitted inserts in one direction only.
async fn attach_tags_tx(
    tx: &mut Transaction<'_, Postgres>,
    stock_id: i32,
    tag_names: &[String],
) -> Result<()> {
    let mut names: Vec<&str> = tag_names.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();

    for name in names {
        let tag_id = resolve_tag_tx(tx, name).await?;
        link_tag_tx(tx, stock_id, tag_id).await?;
    }
    Ok(())
}

#[async_trait]
impl StockRepository for PgStockRepository {
    async fn create(&self, req: CreateStockRequest) -> Result<Stock> {
        let start = Instant::now();
        let tag_count = req.tags.len();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let stock = self.create_tx(&mut tx, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "stocks",
            op = "create",
            stock_id = stock.id,
            tag_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Stock created"
        );
        Ok(stock)
    }

    async fn update(&self, id: i32, req: UpdateStockRequest) -> Result<Stock> {
        let start = Instant::now();
        let tag_count = req.tags.len();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let stock = self.update_tx(&mut tx, id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "stocks",
            op = "update",
            stock_id = id,
            tag_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Stock updated"
        );
        Ok(stock)
    }

    async fn fetch(&self, id: i32) -> Result<Stock> {
        let query = format!("SELECT {} FROM stocks WHERE id = $1", STOCK_COLUMNS);
        let mut stock = sqlx::query_as::<_, Stock>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::StockNotFound(id))?;

        stock.tags = fetch_tags_for_stock(&self.pool, id).await?;
        Ok(stock)
    }

    async fn fetch_by_symbol(&self, symbol: &str) -> Result<Stock> {
        let query = format!(
            "SELECT {} FROM stocks WHERE symbol = $1 ORDER BY id LIMIT 1",
            STOCK_COLUMNS
        );
        let mut stock = sqlx::query_as::<_, Stock>(&query)
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("stock with symbol '{}'", symbol)))?;

        stock.tags = fetch_tags_for_stock(&self.pool, stock.id).await?;
        Ok(stock)
    }

    async fn list(&self) -> Result<Vec<Stock>> {
        let query = format!("SELECT {} FROM stocks ORDER BY symbol", STOCK_COLUMNS);
        let mut stocks = sqlx::query_as::<_, Stock>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        // One tag query per stock, outside any transaction: a write committed
        // between the two reads is visible in the tag set.
        for stock in &mut stocks {
            stock.tags = fetch_tags_for_stock(&self.pool, stock.id).await?;
        }

        debug!(
            subsystem = "database",
            component = "stocks",
            op = "list",
            result_count = stocks.len(),
            "Listed stocks"
        );
        Ok(stocks)
    }

    async fn list_by_tags(&self, tag_names: &[String]) -> Result<Vec<Stock>> {
        if tag_names.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            r#"
            SELECT {}
            FROM stocks s
            WHERE EXISTS (
                SELECT 1
                FROM stock_tags st
                JOIN tags t ON t.id = st.tag_id
                WHERE st.stock_id = s.id AND t.name = ANY($1)
            )
            ORDER BY s.symbol
            "#,
            STOCK_COLUMNS
        );
        let mut stocks = sqlx::query_as::<_, Stock>(&query)
            .bind(tag_names)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        for stock in &mut stocks {
            stock.tags = fetch_tags_for_stock(&self.pool, stock.id).await?;
        }

        debug!(
            subsystem = "database",
            component = "stocks",
            op = "list_by_tags",
            filter_count = tag_names.len(),
            result_count = stocks.len(),
            "Listed stocks by tag"
        );
        Ok(stocks)
    }

    async fn delete(&self, id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let removed = result.rows_affected();
        info!(
            subsystem = "database",
            component = "stocks",
            op = "delete",
            stock_id = id,
            removed,
            "Stock deleted"
        );
        Ok(removed)
    }
}
