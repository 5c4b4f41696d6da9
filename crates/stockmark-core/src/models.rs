//! Core data models for stockmark.
//!
//! These types are shared by the database and API crates. Field names are
//! the wire names: the API serializes them as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// STOCK TYPES
// =============================================================================

/// A tracked stock together with its tag set.
///
/// `tags` is derived from the `stock_tags` junction table and is always
/// ordered by tag name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Stock {
    pub id: i32,
    pub symbol: String,
    pub notes: Option<String>,
    pub watchlist: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Stock {
    /// Names of the attached tags, in name order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Request for creating a new stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateStockRequest {
    pub symbol: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub watchlist: bool,
    /// Tag names to attach. Unknown names are created; duplicates collapse.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request for replacing a stock's fields and its entire tag set.
///
/// An empty `tags` list clears every association of the stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateStockRequest {
    pub symbol: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub watchlist: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

// =============================================================================
// TAG TYPES
// =============================================================================

/// A globally unique, case-sensitive tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
