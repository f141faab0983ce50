//! Content backend access for Folio.
//!
//! This crate provides the typed records a documentation page is built from
//! and a [`ContentSource`] trait for fetching them. This enables:
//!
//! - **Unit testing** without a live backend
//! - **Clean separation** between navigation logic and network I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - Records: [`Document`], [`Block`], [`Sidebar`], [`Category`], [`DocRef`], [`SiteSettings`]
//! - [`ContentSource`] trait with `document()`, `sidebar()` and `settings()` queries
//! - [`HttpSource`] implementation for GROQ query APIs
//! - [`MockSource`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use folio_content::{ContentSource, HttpSource, Perspective};
//!
//! let source = HttpSource::new(
//!     "https://abc123.apicdn.sanity.io",
//!     "production",
//!     "2021-10-21",
//!     Perspective::Published,
//! );
//! if let Some(doc) = source.document("getting-started")? {
//!     println!("{}", doc.title);
//! }
//! ```

mod http;
#[cfg(feature = "mock")]
mod mock;
mod model;
pub mod query;
mod source;

pub use http::HttpSource;
#[cfg(feature = "mock")]
pub use mock::MockSource;
pub use model::{
    Block, Category, CategoryRef, CodeBlock, DocRef, Document, ImageAsset, ImageBlock, MarkDef,
    Sidebar, SiteSettings, Slug, SocialLink, Span, TextBlock,
};
pub use query::Perspective;
pub use source::{ContentError, ContentErrorKind, ContentSource, ErrorStatus};
