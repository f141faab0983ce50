//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;

use crate::handlers;
use crate::live;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/health", get(handlers::health::get_health))
        .route("/api/sidebar", get(handlers::sidebar::get_sidebar))
        .route("/api/docs/{*slug}", get(handlers::pages::get_page))
        .route("/api/revalidate", post(handlers::revalidate::post_revalidate));

    let mut router = Router::new().merge(api_routes);

    if state.live_enabled() {
        router = router.route("/ws/live/{*slug}", get(live::ws_handler));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::referrer_policy_layer()),
        )
        .with_state(state)
}
