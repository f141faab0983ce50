//! Docs API endpoint.
//!
//! Renders a page through the site and returns it as JSON with caching
//! headers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::DateTime;
use folio_config::RenderMode;
use folio_site::PageRequest;
use md5::{Digest, Md5};
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Query string of GET /api/docs/{slug}.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DocsQuery {
    /// Present (with any value) for draft content.
    preview: Option<String>,
}

impl DocsQuery {
    fn is_preview(&self) -> bool {
        self.preview.is_some()
    }
}

/// Handle GET /api/docs/{*slug}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    Query(query): Query<DocsQuery>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let preview = query.is_preview();
    let body = render_json(&state, path, preview).await?;

    let etag = compute_etag(&state.version, &body.json);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let mut response = (
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::ETAG, etag),
            (
                header::CACHE_CONTROL,
                cache_control(state.site.mode(), state.revalidate, preview),
            ),
        ],
        body.json,
    )
        .into_response();

    if let Some(last_modified) = body.updated_at.as_deref().and_then(http_date)
        && let Ok(value) = HeaderValue::from_str(&last_modified)
    {
        response.headers_mut().insert(header::LAST_MODIFIED, value);
    }

    Ok(response)
}

/// Serialized page plus the fields needed for headers.
pub(crate) struct RenderedPage {
    pub(crate) json: String,
    pub(crate) updated_at: Option<String>,
}

/// Render a page on the blocking pool and serialize it.
pub(crate) async fn render_json(
    state: &Arc<AppState>,
    path: String,
    preview: bool,
) -> Result<RenderedPage, ServerError> {
    let site = Arc::clone(&state.site);
    let page = tokio::task::spawn_blocking(move || {
        site.render(&PageRequest {
            path: &path,
            preview,
        })
    })
    .await??;

    let json = serde_json::to_string(&page).map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(RenderedPage {
        json,
        updated_at: page.updated_at,
    })
}

/// `Cache-Control` for a rendered page.
fn cache_control(mode: RenderMode, revalidate: Duration, preview: bool) -> String {
    if preview {
        return "no-store".to_owned();
    }
    match mode {
        RenderMode::Server => "no-cache".to_owned(),
        RenderMode::Static | RenderMode::Hybrid => {
            format!("public, max-age={}", revalidate.as_secs())
        }
    }
}

/// RFC 3339 timestamp to an HTTP date.
fn http_date(timestamp: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(timestamp).ok()?;
    Some(
        parsed
            .to_utc()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string(),
    )
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
pub(crate) fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
