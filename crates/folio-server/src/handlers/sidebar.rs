//! Sidebar API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use folio_content::Sidebar;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/sidebar.
pub(crate) async fn get_sidebar(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Sidebar>, ServerError> {
    let site = Arc::clone(&state.site);
    let sidebar = tokio::task::spawn_blocking(move || site.sidebar()).await??;
    Ok(Json(sidebar))
}
