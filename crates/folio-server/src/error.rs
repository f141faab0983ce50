//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_content::ContentError;
use folio_site::PageError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Document or site settings missing for the requested slug.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// No site settings document exists.
    #[error("Site settings not found")]
    SettingsNotFound,

    /// Content backend query failed.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Blocking task failed or response could not be encoded.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PageError> for ServerError {
    fn from(e: PageError) -> Self {
        Self::PageNotFound(e.slug().to_owned())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(slug) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "slug": slug}),
            ),
            Self::SettingsNotFound => (
                StatusCode::NOT_FOUND,
                json!({"error": "Site settings not found"}),
            ),
            Self::Content(e) => {
                tracing::warn!(error = %e, "Content query failed");
                (StatusCode::BAD_GATEWAY, json!({"error": e.to_string()}))
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            Self::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error"}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
