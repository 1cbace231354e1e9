//! Request-level error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use atrium_identity::IdentityError;
use atrium_storage::StoreError;

/// Failures surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session, or a session/assertion that fails verification.
    #[error("unauthorized")]
    Unauthorized,
    /// Valid session, insufficient role.
    #[error("forbidden")]
    Forbidden,
    /// Missing or malformed request fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No usable invitation; collapses "not found" and "already used".
    #[error("ineligible")]
    Ineligible,
    /// Lost the race on conditional redemption.
    #[error("conflict")]
    Conflict,
    /// Store, issuer or notification sink failure.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::Ineligible => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Forbidden => "Forbidden".to_string(),
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Ineligible => "ineligible".to_string(),
            ApiError::Conflict => "conflict".to_string(),
            // Backend details stay in the logs.
            ApiError::Upstream(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Upstream(detail) = &self {
            tracing::error!(%detail, "request failed upstream");
        }
        let body = Json(serde_json::json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(_: IdentityError) -> Self {
        ApiError::Unauthorized
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => ApiError::Conflict,
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
