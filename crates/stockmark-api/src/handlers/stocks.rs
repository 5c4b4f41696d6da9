//! Stock HTTP handlers.
//!
//! Creates and updates go through the stock-tag transactions: the response
//! always carries the tag set exactly as committed.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use stockmark_core::{CreateStockRequest, Stock, StockRepository, UpdateStockRequest};

use crate::{ApiError, AppState};

/// Query string accepted by the stock listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockFilter {
    /// Comma-separated tag names; only stocks carrying at least one of them
    /// are listed. Names are matched exactly.
    pub tags: Option<String>,
}

impl StockFilter {
    /// Tag names to filter on, or `None` to list everything.
    pub fn tag_names(&self) -> Option<Vec<String>> {
        self.tags
            .as_deref()
            .map(|raw| raw.split(',').map(str::to_string).collect())
    }
}

/// List stocks ordered by symbol, each with its tags.
#[utoipa::path(
    get,
    path = "/api/stocks",
    tag = "Stocks",
    params(StockFilter),
    responses(
        (status = 200, description = "Matching stocks", body = [Stock]),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn list_stocks(
    State(state): State<AppState>,
    filter: Result<Query<StockFilter>, QueryRejection>,
) -> Result<Json<Vec<Stock>>, ApiError> {
    let Query(filter) = filter?;
    let stocks = match filter.tag_names() {
        Some(names) => state.db.stocks.list_by_tags(&names).await?,
        None => state.db.stocks.list().await?,
    };
    Ok(Json(stocks))
}

/// Create a stock and attach its tags.
///
/// # Returns
/// - 201 Created with the stored stock
/// - 409 Conflict if concurrent writers could not settle on a tag
#[utoipa::path(
    post,
    path = "/api/stocks",
    tag = "Stocks",
    request_body = CreateStockRequest,
    responses(
        (status = 201, description = "Stock created", body = Stock),
        (status = 409, description = "Constraint violation or lost tag race"),
        (status = 422, description = "Malformed body")
    )
)]
pub async fn create_stock(
    State(state): State<AppState>,
    payload: Result<Json<CreateStockRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Stock>), ApiError> {
    let Json(req) = payload?;
    let stock = state.db.stocks.create(req).await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

/// Get one stock with its tags.
#[utoipa::path(
    get,
    path = "/api/stocks/{id}",
    tag = "Stocks",
    params(("id" = i32, Path, description = "Stock id")),
    responses(
        (status = 200, description = "The stock", body = Stock),
        (status = 404, description = "Stock not found")
    )
)]
pub async fn get_stock(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Stock>, ApiError> {
    let Path(id) = id?;
    let stock = state.db.stocks.fetch(id).await?;
    Ok(Json(stock))
}

/// Get the stock with an exact symbol. With duplicates, the oldest wins.
#[utoipa::path(
    get,
    path = "/api/stocks/by-symbol/{symbol}",
    tag = "Stocks",
    params(("symbol" = String, Path, description = "Ticker symbol, case-sensitive")),
    responses(
        (status = 200, description = "The stock", body = Stock),
        (status = 404, description = "No stock with this symbol")
    )
)]
pub async fn get_stock_by_symbol(
    State(state): State<AppState>,
    symbol: Result<Path<String>, PathRejection>,
) -> Result<Json<Stock>, ApiError> {
    let Path(symbol) = symbol?;
    let stock = state.db.stocks.fetch_by_symbol(&symbol).await?;
    Ok(Json(stock))
}

/// Replace a stock's fields and its whole tag set.
///
/// An empty `tags` array removes every tag from the stock.
#[utoipa::path(
    put,
    path = "/api/stocks/{id}",
    tag = "Stocks",
    params(("id" = i32, Path, description = "Stock id")),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = Stock),
        (status = 404, description = "Stock not found"),
        (status = 409, description = "Constraint violation or lost tag race")
    )
)]
pub async fn update_stock(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateStockRequest>, JsonRejection>,
) -> Result<Json<Stock>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let stock = state.db.stocks.update(id, req).await?;
    Ok(Json(stock))
}

/// Delete a stock. Deleting an unknown id also answers 204.
#[utoipa::path(
    delete,
    path = "/api/stocks/{id}",
    tag = "Stocks",
    params(("id" = i32, Path, description = "Stock id")),
    responses((status = 204, description = "Stock deleted or absent"))
)]
pub async fn delete_stock(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.db.stocks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
