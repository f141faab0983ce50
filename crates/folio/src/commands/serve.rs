//! `folio serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_config::{CliSettings, Config, RenderMode};
use folio_server::{run_server, server_config_from_folio_config};

use super::site_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Render mode: static, server or hybrid (overrides config).
    #[arg(short, long)]
    mode: Option<RenderMode>,

    /// Enable live preview (default: enabled).
    #[arg(long)]
    live: Option<bool>,

    /// Disable live preview.
    #[arg(long, conflicts_with = "live")]
    no_live: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, static prebuild fails or the
    /// server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            mode: self.mode,
            live_enabled: self.no_live.then_some(false).or(self.live),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = Arc::new(site_from_config(&config, config.render.mode)?);

        output.field(
            "Listening",
            format_args!("http://{}:{}", config.server.host, config.server.port),
        );
        output.field(
            "Content",
            format_args!("{}/{}", config.content.project_id, config.content.dataset),
        );
        output.field("Render mode", mode_name(config.render.mode));

        if config.render.mode == RenderMode::Static {
            let prebuild_site = Arc::clone(&site);
            let slugs = tokio::task::spawn_blocking(move || prebuild_site.prebuild())
                .await
                .map_err(|e| CliError::Server(e.to_string()))??;
            output.field("Prebuilt pages", slugs.len());
        }

        output.field(
            "Live preview",
            if config.live.enabled { "enabled" } else { "disabled" },
        );

        let server_config = server_config_from_folio_config(&config, version.to_owned());
        run_server(server_config, site)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

fn mode_name(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Static => "static",
        RenderMode::Server => "server",
        RenderMode::Hybrid => "hybrid",
    }
}
