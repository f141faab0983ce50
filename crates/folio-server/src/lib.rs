//! HTTP server for Folio.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - API endpoints for page rendering, the sidebar and site settings
//! - A revalidation endpoint that drops stored snapshots
//! - A WebSocket endpoint pushing preview updates while editing
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let site = Arc::new(build_site());
//!     run_server(ServerConfig::default(), site).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Frontend ──HTTP──► axum server (folio-server)
//!                        │
//!                        ├─► API routes ──► spawn_blocking ──► Site::render
//!                        │                                        │
//!                        │                                        └─► content backend
//!                        │
//!                        └─► WebSocket ──► poll Site::render (preview)
//! ```

mod app;
mod error;
mod handlers;
mod live;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use folio_site::Site;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable the live preview WebSocket.
    pub live_enabled: bool,
    /// How often live preview connections re-render their page.
    pub live_poll_interval: Duration,
    /// Stored snapshot lifetime, advertised through `Cache-Control`.
    pub revalidate: Duration,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            live_enabled: true,
            live_poll_interval: Duration::from_secs(1),
            revalidate: Duration::from_secs(10),
            version: String::new(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `site` - Site serving the pages
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig, site: Arc<Site>) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        site,
        live_poll_interval: config.live_enabled.then_some(config.live_poll_interval),
        revalidate: config.revalidate,
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, live = config.live_enabled, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Folio config.
///
/// # Arguments
///
/// * `config` - Folio configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_folio_config(config: &folio_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        live_enabled: config.live.enabled,
        live_poll_interval: Duration::from_millis(config.live.poll_interval_ms),
        revalidate: Duration::from_secs(config.render.revalidate_secs),
        version,
    }
}

#[cfg(test)]
mod tests {
    use folio_config::Config;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_folio_config() {
        let mut config = Config::default();
        config.server.port = 4000;
        config.live.enabled = false;
        config.live.poll_interval_ms = 250;
        config.render.revalidate_secs = 60;

        let server = server_config_from_folio_config(&config, "1.2.3".to_owned());

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 4000);
        assert!(!server.live_enabled);
        assert_eq!(server.live_poll_interval, Duration::from_millis(250));
        assert_eq!(server.revalidate, Duration::from_secs(60));
        assert_eq!(server.version, "1.2.3");
    }
}
