//! On-demand revalidation endpoint.
//!
//! Drops stored snapshots so the next request refetches them. Content
//! backends call this from a publish webhook.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Body of POST /api/revalidate.
#[derive(Debug, Default, Deserialize)]
struct RevalidateRequest {
    /// Slug to drop; all snapshots when absent.
    #[serde(default)]
    slug: Option<String>,
}

/// Handle POST /api/revalidate.
///
/// An empty body revalidates everything.
pub(crate) async fn post_revalidate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, ServerError> {
    let request = parse_request(&body)?;

    state.site.invalidate(request.slug.as_deref());
    tracing::info!(slug = ?request.slug, "Revalidated");

    Ok(StatusCode::NO_CONTENT)
}

fn parse_request(body: &[u8]) -> Result<RevalidateRequest, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RevalidateRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(e.to_string()))
}
