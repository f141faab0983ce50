//! Site facade over the acquisition strategies.
//!
//! [`Site`] picks a strategy for the configured [`RenderMode`] and routes
//! preview requests through a [`LiveSubscribed`] wrapper around it. The
//! published strategy never sees draft content, so preview requests cannot
//! leak drafts into stored snapshots.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_site::{PageRequest, Site, SiteConfig};
//!
//! let site = Site::new(published, preview, SiteConfig::default());
//! let page = site.render(&PageRequest::new("getting-started/install"))?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use folio_config::RenderMode;
use folio_content::{ContentError, ContentSource, Sidebar, SiteSettings};

use crate::acquire::{Acquire, DEFAULT_PREBUILD_CONCURRENCY, LiveSubscribed, OnDemand, Precomputed};
use crate::page::{Page, PageError, assemble};
use crate::slug::active_slug;

/// Site configuration.
#[derive(Clone, Copy, Debug)]
pub struct SiteConfig {
    /// Acquisition mode.
    pub mode: RenderMode,
    /// How long a stored snapshot is served before it is refetched.
    pub revalidate: Duration,
    /// Pages fetched in parallel while prebuilding.
    pub prebuild_concurrency: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            revalidate: Duration::from_secs(10),
            prebuild_concurrency: DEFAULT_PREBUILD_CONCURRENCY,
        }
    }
}

/// A page render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest<'a> {
    /// Route path below `/docs/`, e.g. `getting-started/install`.
    pub path: &'a str,
    /// Render draft content.
    pub preview: bool,
}

impl<'a> PageRequest<'a> {
    /// Published request for `path`.
    #[must_use]
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            preview: false,
        }
    }

    /// Preview request for `path`.
    #[must_use]
    pub fn preview(path: &'a str) -> Self {
        Self {
            path,
            preview: true,
        }
    }
}

/// Documentation site backed by a content source.
pub struct Site {
    mode: RenderMode,
    published: Arc<dyn ContentSource>,
    strategy: Arc<dyn Acquire>,
    precomputed: Option<Arc<Precomputed>>,
    live: LiveSubscribed,
}

impl Site {
    /// Create a site.
    ///
    /// # Arguments
    ///
    /// * `published` - Source of published content
    /// * `preview` - Source of draft content, used for preview requests
    /// * `config` - Acquisition mode and revalidate window
    #[must_use]
    pub fn new(
        published: Arc<dyn ContentSource>,
        preview: Arc<dyn ContentSource>,
        config: SiteConfig,
    ) -> Self {
        let precomputed = match config.mode {
            RenderMode::Server => None,
            RenderMode::Static | RenderMode::Hybrid => Some(Arc::new(
                Precomputed::new(Arc::clone(&published), config.revalidate)
                    .with_concurrency(config.prebuild_concurrency),
            )),
        };
        let strategy: Arc<dyn Acquire> = match &precomputed {
            Some(precomputed) => Arc::<Precomputed>::clone(precomputed),
            None => Arc::new(OnDemand::new(Arc::clone(&published))),
        };

        Self {
            mode: config.mode,
            published,
            live: LiveSubscribed::new(Arc::clone(&strategy), preview),
            strategy,
            precomputed,
        }
    }

    /// Configured acquisition mode.
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Store snapshots for every sidebar document.
    ///
    /// Returns the prebuilt slugs. Does nothing in `server` mode.
    ///
    /// # Errors
    ///
    /// Returns the sidebar query error.
    pub fn prebuild(&self) -> Result<Vec<String>, ContentError> {
        match &self.precomputed {
            Some(precomputed) => precomputed.prebuild(),
            None => Ok(Vec::new()),
        }
    }

    /// Render the page for a request.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotFound`] when the path has no slug or the
    /// document or site settings are missing.
    pub fn render(&self, request: &PageRequest<'_>) -> Result<Page, PageError> {
        let Some(slug) = active_slug(request.path) else {
            return Err(PageError::NotFound {
                slug: request.path.to_owned(),
                missing: "document",
            });
        };

        let snapshot = if request.preview {
            self.live.acquire(slug)
        } else {
            self.strategy.acquire(slug)
        };

        assemble(&snapshot, slug)
    }

    /// Current published sidebar, empty when none exists.
    ///
    /// # Errors
    ///
    /// Returns the query error.
    pub fn sidebar(&self) -> Result<Sidebar, ContentError> {
        Ok(self.published.sidebar()?.unwrap_or_default())
    }

    /// Current published site settings.
    ///
    /// # Errors
    ///
    /// Returns the query error.
    pub fn settings(&self) -> Result<Option<SiteSettings>, ContentError> {
        self.published.settings()
    }

    /// Drop stored snapshots: one slug, or all when `None`.
    pub fn invalidate(&self, slug: Option<&str>) {
        self.strategy.invalidate(slug);
    }
}
