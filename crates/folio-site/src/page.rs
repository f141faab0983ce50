//! Page assembly.
//!
//! [`assemble`] turns a [`PageSnapshot`] into the [`Page`] handed to the
//! presentation layer. It is a pure function of the snapshot: the outline,
//! navigation and body HTML are recomputed on every call.

use folio_content::{Block, Sidebar, SiteSettings};
use serde::Serialize;
use tracing::debug;

use crate::body::render_html;
use crate::navigation::{self, NavEntry};
use crate::outline::{OutlineNode, nest, outline};
use crate::snapshot::PageSnapshot;

/// Error assembling a page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A required record is missing or failed to load.
    #[error("Page not found: {slug} (missing {missing})")]
    NotFound {
        /// Requested slug.
        slug: String,
        /// Which record was missing: `document` or `settings`.
        missing: &'static str,
    },
}

impl PageError {
    /// The slug the error is about.
    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            Self::NotFound { slug, .. } => slug,
        }
    }
}

/// Everything the presentation layer needs to render one page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Site settings, passed through unchanged.
    pub site_config: SiteSettings,
    /// Full sidebar; empty when it could not be loaded.
    pub sidebar: Sidebar,
    /// Heading tree of the document body.
    pub table_of_contents: Vec<OutlineNode>,
    /// Slug of the rendered document.
    pub active_slug: String,
    /// Document title.
    pub document_title: String,
    /// Raw body blocks.
    pub document_body: Vec<Block>,
    /// Body rendered to HTML.
    pub html: String,
    /// Previous document in sidebar order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_nav_entry: Option<NavEntry>,
    /// Next document in sidebar order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_nav_entry: Option<NavEntry>,
    /// Document update timestamp (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Assemble the page for `active_slug` from a snapshot.
///
/// # Errors
///
/// Returns [`PageError::NotFound`] when the document or the site settings
/// are missing. A missing sidebar is not an error: the page renders with
/// empty navigation.
pub fn assemble(snapshot: &PageSnapshot, active_slug: &str) -> Result<Page, PageError> {
    let not_found = |missing| PageError::NotFound {
        slug: active_slug.to_owned(),
        missing,
    };
    let document = snapshot.document.as_ref().ok_or_else(|| not_found("document"))?;
    let settings = snapshot.settings.as_ref().ok_or_else(|| not_found("settings"))?;

    let duplicates = navigation::duplicate_slugs(&snapshot.sidebar);
    if !duplicates.is_empty() {
        debug!(?duplicates, "Sidebar has duplicate slugs, first occurrence wins");
    }
    let nav = navigation::resolve(&snapshot.sidebar, active_slug);

    Ok(Page {
        site_config: settings.clone(),
        sidebar: snapshot.sidebar.clone(),
        table_of_contents: nest(outline(&document.body)),
        active_slug: active_slug.to_owned(),
        document_title: document.title.clone(),
        document_body: document.body.clone(),
        html: render_html(&document.body),
        previous_nav_entry: nav.previous.map(NavEntry::from),
        next_nav_entry: nav.next.map(NavEntry::from),
        updated_at: document.updated_at.clone(),
    })
}

#[cfg(test)]
mod tests {
    use folio_content::{Category, DocRef, Document};
    use pretty_assertions::assert_eq;

    use super::*;

    fn snapshot(slug: &str) -> PageSnapshot {
        PageSnapshot {
            document: Some(
                Document::new(slug, "Installation")
                    .with_category("basics", "Basics")
                    .with_body(vec![
                        Block::heading(2, "Requirements"),
                        Block::paragraph("Rust 1.91"),
                        Block::heading(3, "Linux"),
                    ]),
            ),
            sidebar: Sidebar::new(vec![
                Category::new(
                    "basics",
                    "Basics",
                    vec![
                        DocRef::new("intro", "Introduction", "basics"),
                        DocRef::new("install", "Installation", "basics"),
                    ],
                ),
                Category::new(
                    "guides",
                    "Guides",
                    vec![DocRef::new("deploy", "Deploying", "guides")],
                ),
            ]),
            settings: Some(SiteSettings::new("Folio")),
            failed: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_full_page() {
        let page = assemble(&snapshot("install"), "install").unwrap();

        assert_eq!(page.document_title, "Installation");
        assert_eq!(page.site_config.title, "Folio");
        assert_eq!(page.active_slug, "install");
        assert_eq!(page.table_of_contents.len(), 1);
        assert_eq!(page.table_of_contents[0].children[0].entry.id, "linux");
        assert_eq!(
            page.previous_nav_entry.map(|e| e.href),
            Some("/docs/basics/intro".to_owned())
        );
        assert_eq!(
            page.next_nav_entry.map(|e| e.href),
            Some("/docs/guides/deploy".to_owned())
        );
        assert!(page.html.starts_with(r#"<h2 id="requirements">"#));
    }

    #[test]
    fn test_assemble_missing_document() {
        let mut snapshot = snapshot("install");
        snapshot.document = None;

        let err = assemble(&snapshot, "install").unwrap_err();

        assert!(matches!(
            err,
            PageError::NotFound {
                missing: "document",
                ..
            }
        ));
        assert_eq!(err.slug(), "install");
    }

    #[test]
    fn test_assemble_missing_settings() {
        let mut snapshot = snapshot("install");
        snapshot.settings = None;

        let err = assemble(&snapshot, "install").unwrap_err();

        assert!(matches!(
            err,
            PageError::NotFound {
                missing: "settings",
                ..
            }
        ));
    }

    #[test]
    fn test_assemble_missing_sidebar_renders_without_navigation() {
        let mut snapshot = snapshot("install");
        snapshot.sidebar = Sidebar::default();

        let page = assemble(&snapshot, "install").unwrap();

        assert!(page.sidebar.is_empty());
        assert_eq!(page.previous_nav_entry, None);
        assert_eq!(page.next_nav_entry, None);
        assert_eq!(page.document_title, "Installation");
    }

    #[test]
    fn test_assemble_slug_not_in_sidebar() {
        let page = assemble(&snapshot("orphan"), "orphan").unwrap();

        assert_eq!(page.previous_nav_entry, None);
        assert_eq!(page.next_nav_entry, None);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = assemble(&snapshot("intro"), "intro").unwrap();

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["siteConfig"]["title"], "Folio");
        assert_eq!(json["activeSlug"], "intro");
        assert_eq!(json["documentTitle"], "Installation");
        assert_eq!(json["tableOfContents"][0]["title"], "Requirements");
        assert_eq!(json["documentBody"][0]["_type"], "block");
        assert_eq!(json["sidebar"][0]["slug"]["current"], "basics");
        assert_eq!(json["nextNavEntry"]["slug"], "install");
        assert!(json.get("previousNavEntry").is_none());
        assert!(json.get("updatedAt").is_none());
    }
}
