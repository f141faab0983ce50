//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;
use std::time::Duration;

use folio_site::Site;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Site used to render pages.
    pub(crate) site: Arc<Site>,
    /// Live preview polling interval (`None` disables the WebSocket).
    pub(crate) live_poll_interval: Option<Duration>,
    /// Stored snapshot lifetime, advertised through `Cache-Control`.
    pub(crate) revalidate: Duration,
    /// Application version, mixed into `ETag`s.
    pub(crate) version: String,
}

impl AppState {
    /// Check if live preview is enabled.
    #[must_use]
    pub(crate) fn live_enabled(&self) -> bool {
        self.live_poll_interval.is_some()
    }
}
