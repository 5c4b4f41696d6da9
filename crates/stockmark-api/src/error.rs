//! Mapping of core errors onto HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockmark_core::ErrorKind;

/// Error returned by every handler.
///
/// The body is always `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
    /// An extractor refused the request; carries the extractor's own status.
    Rejected(StatusCode, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected(status, _) => *status,
        }
    }
}

impl From<stockmark_core::Error> for ApiError {
    fn from(err: stockmark_core::Error) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound(msg),
            ErrorKind::Validation => ApiError::BadRequest(msg),
            ErrorKind::ConstraintViolation => ApiError::Conflict(msg),
            ErrorKind::Connection => {
                tracing::error!(subsystem = "api", error = %msg, "Database unavailable");
                ApiError::Unavailable("Database unavailable".to_string())
            }
            ErrorKind::Internal => {
                tracing::error!(subsystem = "api", error = %msg, "Unhandled database error");
                ApiError::Internal(msg)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unavailable(msg)
            | ApiError::Internal(msg)
            | ApiError::Rejected(_, msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
