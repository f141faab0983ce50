//! Configuration API endpoint.
//!
//! Returns site settings plus client-side options for the frontend.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use folio_config::RenderMode;
use folio_content::SiteSettings;
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    /// Site settings document.
    site_config: SiteSettings,
    /// Acquisition mode.
    render_mode: RenderMode,
    /// Whether the live preview WebSocket is available.
    live_enabled: bool,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConfigResponse>, ServerError> {
    let site = Arc::clone(&state.site);
    let settings = tokio::task::spawn_blocking(move || site.settings())
        .await??
        .ok_or(ServerError::SettingsNotFound)?;

    Ok(Json(ConfigResponse {
        site_config: settings,
        render_mode: state.site.mode(),
        live_enabled: state.live_enabled(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_response_serialization() {
        let response = ConfigResponse {
            site_config: SiteSettings::new("Docs"),
            render_mode: RenderMode::Hybrid,
            live_enabled: true,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["siteConfig"]["title"], "Docs");
        assert_eq!(json["renderMode"], "hybrid");
        assert_eq!(json["liveEnabled"], true);
    }
}
