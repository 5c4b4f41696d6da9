//! Core traits for stockmark abstractions.
//!
//! These traits define the interfaces that concrete storage implementations
//! must satisfy.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// STOCK REPOSITORY TRAIT
// =============================================================================

/// Repository for stocks and their tag associations.
///
/// `create` and `update` are atomic: either the stock row and its complete
/// tag set are written together, or nothing is.
#[async_trait]
pub trait StockRepository: Send + Sync {
    /// Insert a stock and attach its tags, creating unknown tags on the way.
    async fn create(&self, req: CreateStockRequest) -> Result<Stock>;

    /// Replace a stock's fields and its whole tag set.
    ///
    /// Returns `Error::StockNotFound` when no stock has this id.
    async fn update(&self, id: i32, req: UpdateStockRequest) -> Result<Stock>;

    /// Fetch one stock with its tags.
    async fn fetch(&self, id: i32) -> Result<Stock>;

    /// Fetch the stock with this exact symbol.
    ///
    /// Symbols are not unique; the oldest matching stock wins. Returns
    /// `Error::NotFound` when no stock carries the symbol.
    async fn fetch_by_symbol(&self, symbol: &str) -> Result<Stock>;

    /// List all stocks ordered by symbol, each with its tags.
    async fn list(&self) -> Result<Vec<Stock>>;

    /// List the stocks carrying at least one of `tag_names`, ordered by
    /// symbol. Each stock appears once and keeps its full tag set.
    async fn list_by_tags(&self, tag_names: &[String]) -> Result<Vec<Stock>>;

    /// Delete a stock. Unknown ids are a no-op; returns rows removed.
    async fn delete(&self, id: i32) -> Result<u64>;
}

// =============================================================================
// TAG REPOSITORY TRAIT
// =============================================================================

/// Repository for tags.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List all tags ordered by name.
    async fn list(&self) -> Result<Vec<Tag>>;

    /// List the tags attached to a stock ordered by name.
    async fn list_for_stock(&self, stock_id: i32) -> Result<Vec<Tag>>;

    /// Resolve a tag name to its id in a transaction of its own, creating
    /// the tag when absent.
    async fn resolve(&self, name: &str) -> Result<i32>;
}
