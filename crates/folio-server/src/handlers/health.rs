//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use folio_config::RenderMode;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/health.
#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: String,
    mode: RenderMode,
}

/// Handle GET /api/health.
///
/// Does not touch the content backend.
pub(crate) async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: state.version.clone(),
        mode: state.site.mode(),
    })
}
