//! Page assembly and navigation for Folio.
//!
//! This crate provides:
//! - [`outline`] / [`nest`]: table of contents from a document body
//! - [`navigation::resolve`]: previous/next lookup over the sidebar order
//! - [`render_html`]: rich-content body to HTML with matching heading anchors
//! - [`Acquire`] strategies ([`OnDemand`], [`Precomputed`], [`LiveSubscribed`])
//! - [`Site`]: render-mode aware facade producing [`Page`] values
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_content::{HttpSource, Perspective};
//! use folio_site::{PageRequest, Site, SiteConfig};
//!
//! let published = Arc::new(HttpSource::new(base, "production", "2021-10-21", Perspective::Published));
//! let preview = Arc::new(HttpSource::new(base, "production", "2021-10-21", Perspective::Drafts));
//! let site = Site::new(published, preview, SiteConfig::default());
//!
//! let page = site.render(&PageRequest::new("getting-started/install"))?;
//! println!("{}", page.document_title);
//! ```

mod acquire;
mod body;
pub mod navigation;
mod outline;
mod page;
mod site;
mod slug;
mod snapshot;

pub use acquire::{Acquire, DEFAULT_PREBUILD_CONCURRENCY, LiveSubscribed, OnDemand, Precomputed};
pub use body::render_html;
pub use navigation::{NavEntry, NavigationContext};
pub use outline::{OutlineEntry, OutlineNode, nest, outline};
pub use page::{Page, PageError, assemble};
pub use site::{PageRequest, Site, SiteConfig};
pub use slug::{active_slug, escape_html, slugify};
pub use snapshot::PageSnapshot;
