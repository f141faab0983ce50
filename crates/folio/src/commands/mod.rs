//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod serve;

use std::sync::Arc;
use std::time::Duration;

use folio_config::{Config, RenderMode};
use folio_content::{HttpSource, Perspective};
use folio_site::{Site, SiteConfig};

pub(crate) use build::BuildArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;

/// Create a site backed by the configured content backend.
///
/// Published queries may go through the CDN; preview queries always use the
/// live API with the drafts perspective.
pub(crate) fn site_from_config(config: &Config, mode: RenderMode) -> Result<Site, CliError> {
    let content = config.require_content()?;

    let source = |preview: bool| {
        HttpSource::new(
            &content.base_url(preview),
            &content.dataset,
            &content.api_version,
            Perspective::for_preview(preview),
        )
        .with_token(content.token.clone())
    };

    Ok(Site::new(
        Arc::new(source(false)),
        Arc::new(source(true)),
        SiteConfig {
            mode,
            revalidate: Duration::from_secs(config.render.revalidate_secs),
            prebuild_concurrency: config.render.prebuild_concurrency,
        },
    ))
}
