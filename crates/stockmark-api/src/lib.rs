//! stockmark-api - HTTP API for stockmark
//!
//! The binary in `main.rs` wires configuration, logging and the database
//! pool; this library owns the router so it can be exercised in tests.

pub mod config;
pub mod error;
pub mod handlers;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use stockmark_db::Database;

pub use config::Config;
pub use error::ApiError;

use handlers::{
    health_check,
    stocks::{
        create_stock, delete_stock, get_stock, get_stock_by_symbol, list_stocks, update_stock,
    },
    tags::{list_stock_tags, list_tags},
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "stockmark API",
        description = "Stocks with a many-to-many tag association"
    ),
    paths(
        handlers::health_check,
        handlers::stocks::list_stocks,
        handlers::stocks::create_stock,
        handlers::stocks::get_stock,
        handlers::stocks::get_stock_by_symbol,
        handlers::stocks::update_stock,
        handlers::stocks::delete_stock,
        handlers::tags::list_tags,
        handlers::tags::list_stock_tags,
    ),
    components(schemas(
        stockmark_core::Stock,
        stockmark_core::Tag,
        stockmark_core::CreateStockRequest,
        stockmark_core::UpdateStockRequest,
        handlers::HealthResponse,
    )),
    tags(
        (name = "Stocks", description = "Stock CRUD with atomic tag replacement"),
        (name = "Tags", description = "Tag listing"),
        (name = "System", description = "Liveness")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// =============================================================================
// ROUTER
// =============================================================================

/// CORS policy: explicit origin whitelist, credentials allowed.
pub fn cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}

/// Build the full application router.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        .route("/api/stocks", get(list_stocks).post(create_stock))
        .route(
            "/api/stocks/:id",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
        .route("/api/stocks/by-symbol/:symbol", get(get_stock_by_symbol))
        .route("/api/stocks/:id/tags", get(list_stock_tags))
        .route("/api/tags", get(list_tags))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}
