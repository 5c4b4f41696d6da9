//! HTTP handlers.

pub mod stocks;
pub mod tags;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::AppState;

/// Liveness response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Report liveness. Does not query the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    stockmark_db::log_pool_metrics(state.db.pool());
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
