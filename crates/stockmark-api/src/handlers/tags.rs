//! Tag HTTP handlers.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};

use stockmark_core::{Tag, TagRepository};

use crate::{ApiError, AppState};

/// List all tags ordered by name.
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "Tags",
    responses(
        (status = 200, description = "All tags", body = [Tag]),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = state.db.tags.list().await?;
    Ok(Json(tags))
}

/// List the tags of one stock ordered by name.
///
/// An unknown stock id yields an empty list.
#[utoipa::path(
    get,
    path = "/api/stocks/{id}/tags",
    tag = "Tags",
    params(("id" = i32, Path, description = "Stock id")),
    responses((status = 200, description = "Tags of the stock", body = [Tag]))
)]
pub async fn list_stock_tags(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let Path(id) = id?;
    let tags = state.db.tags.list_for_stock(id).await?;
    Ok(Json(tags))
}
