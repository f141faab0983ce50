//! Mock content source for testing.
//!
//! Provides [`MockSource`] for unit testing without a backend.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{Document, Sidebar, SiteSettings};
use crate::source::{ContentError, ContentErrorKind, ContentSource, ErrorStatus};

/// Mock content source.
///
/// Stores records in memory. Use the builder methods to configure the mock
/// with test data and the setters to change it between renders.
///
/// # Example
///
/// ```ignore
/// use folio_content::{Document, MockSource, SiteSettings};
///
/// let source = MockSource::new()
///     .with_document(Document::new("intro", "Introduction"))
///     .with_settings(SiteSettings::new("Docs"));
///
/// let doc = source.document("intro").unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    documents: RwLock<HashMap<String, Document>>,
    sidebar: RwLock<Option<Sidebar>>,
    settings: RwLock<Option<SiteSettings>>,
    failing: RwLock<Vec<&'static str>>,
    document_calls: AtomicUsize,
    sidebar_calls: AtomicUsize,
    settings_calls: AtomicUsize,
}

impl MockSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, keyed by its slug.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, document: Document) -> Self {
        self.set_document(document);
        self
    }

    /// Set the sidebar.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_sidebar(self, sidebar: Sidebar) -> Self {
        *self.sidebar.write().unwrap() = Some(sidebar);
        self
    }

    /// Set the site settings.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_settings(self, settings: SiteSettings) -> Self {
        *self.settings.write().unwrap() = Some(settings);
        self
    }

    /// Make a query fail with an `Unavailable` error.
    ///
    /// `query` is one of `"document"`, `"sidebar"`, `"settings"`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing(self, query: &'static str) -> Self {
        self.failing.write().unwrap().push(query);
        self
    }

    /// Insert or replace a document.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_document(&self, document: Document) {
        self.documents
            .write()
            .unwrap()
            .insert(document.slug.current.clone(), document);
    }

    /// Remove a document.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_document(&self, slug: &str) {
        self.documents.write().unwrap().remove(slug);
    }

    /// Stop failing a query configured with [`failing`](Self::failing).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn recover(&self, query: &'static str) {
        self.failing.write().unwrap().retain(|q| *q != query);
    }

    /// Replace the sidebar.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_sidebar(&self, sidebar: Option<Sidebar>) {
        *self.sidebar.write().unwrap() = sidebar;
    }

    /// Replace the site settings.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_settings(&self, settings: Option<SiteSettings>) {
        *self.settings.write().unwrap() = settings;
    }

    /// Number of `document` queries served.
    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    /// Number of `sidebar` queries served.
    pub fn sidebar_calls(&self) -> usize {
        self.sidebar_calls.load(Ordering::SeqCst)
    }

    /// Number of `settings` queries served.
    pub fn settings_calls(&self) -> usize {
        self.settings_calls.load(Ordering::SeqCst)
    }

    fn check(&self, query: &'static str) -> Result<(), ContentError> {
        if self.failing.read().unwrap().contains(&query) {
            return Err(ContentError::new(ContentErrorKind::Unavailable)
                .with_status(ErrorStatus::Temporary)
                .with_backend("Mock")
                .with_query(query));
        }
        Ok(())
    }
}

impl ContentSource for MockSource {
    fn document(&self, slug: &str) -> Result<Option<Document>, ContentError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.check("document")?;
        Ok(self.documents.read().unwrap().get(slug).cloned())
    }

    fn sidebar(&self) -> Result<Option<Sidebar>, ContentError> {
        self.sidebar_calls.fetch_add(1, Ordering::SeqCst);
        self.check("sidebar")?;
        Ok(self.sidebar.read().unwrap().clone())
    }

    fn settings(&self) -> Result<Option<SiteSettings>, ContentError> {
        self.settings_calls.fetch_add(1, Ordering::SeqCst);
        self.check("settings")?;
        Ok(self.settings.read().unwrap().clone())
    }
}
