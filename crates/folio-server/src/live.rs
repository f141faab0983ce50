//! Live preview over WebSocket.
//!
//! Each connection re-renders its page in preview mode on every poll tick
//! and pushes the page only when its content changed since the last push.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use tokio::time::{MissedTickBehavior, interval};

use crate::error::ServerError;
use crate::handlers::pages::{compute_etag, render_json};
use crate::state::AppState;

/// Handle WebSocket upgrade for live preview.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, path))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, path: String) {
    let Some(poll_interval) = state.live_poll_interval else {
        return;
    };

    let mut ticker = interval(poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_hash: Option<String> = None;

    tracing::debug!(path = %path, "Live preview connected");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(message) = poll(&state, &path, &mut last_hash).await else {
                    continue;
                };
                if socket.send(Message::Text(message.into())).await.is_err() {
                    break;
                }
            }
            // Client messages only keep the connection alive
            result = socket.recv() => {
                match result {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }

    tracing::debug!(path = %path, "Live preview disconnected");
}

/// Render the page and return the message to push, if anything changed.
async fn poll(state: &Arc<AppState>, path: &str, last_hash: &mut Option<String>) -> Option<String> {
    let message = match render_json(state, path.to_owned(), true).await {
        Ok(page) => format!(r#"{{"type":"page","page":{}}}"#, page.json),
        Err(ServerError::PageNotFound(slug)) => {
            json!({"type": "notFound", "slug": slug}).to_string()
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Live preview render failed");
            return None;
        }
    };

    let hash = compute_etag("", &message);
    if last_hash.as_deref() == Some(hash.as_str()) {
        return None;
    }
    *last_hash = Some(hash);
    Some(message)
}

#[cfg(test)]
mod tests {
    use folio_content::{Document, MockSource, SiteSettings};
    use folio_site::{Site, SiteConfig};

    use super::*;

    fn state(source: Arc<MockSource>, preview: Arc<MockSource>) -> Arc<AppState> {
        Arc::new(AppState {
            site: Arc::new(Site::new(source, preview, SiteConfig::default())),
            live_poll_interval: Some(Duration::from_millis(10)),
            revalidate: Duration::from_secs(10),
            version: "test".to_owned(),
        })
    }

    #[tokio::test]
    async fn test_poll_pushes_only_on_change() {
        let source = Arc::new(
            MockSource::new()
                .with_document(Document::new("intro", "Introduction"))
                .with_settings(SiteSettings::new("Docs")),
        );
        let preview = Arc::new(MockSource::new());
        let state = state(source, Arc::clone(&preview));
        let mut last_hash = None;

        let first = poll(&state, "intro", &mut last_hash).await.unwrap();
        let unchanged = poll(&state, "intro", &mut last_hash).await;
        preview.set_document(Document::new("intro", "Draft"));
        let changed = poll(&state, "intro", &mut last_hash).await.unwrap();

        assert!(first.contains(r#""documentTitle":"Introduction""#));
        assert_eq!(unchanged, None);
        assert!(changed.contains(r#""documentTitle":"Draft""#));
    }

    #[tokio::test]
    async fn test_poll_reports_missing_page() {
        let state = state(Arc::new(MockSource::new()), Arc::new(MockSource::new()));
        let mut last_hash = None;

        let message = poll(&state, "docs/missing", &mut last_hash).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(json, json!({"type": "notFound", "slug": "missing"}));
    }
}
