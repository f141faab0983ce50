//! The three records a page is rendered from.

use std::thread;

use folio_content::{ContentError, ContentSource, Document, Sidebar, SiteSettings};
use tracing::warn;

/// Document, sidebar and settings as fetched for one slug.
///
/// A failed query leaves its record empty and is listed in `failed`; the
/// assembler treats an empty document or settings as "not found" either way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageSnapshot {
    /// The requested document.
    pub document: Option<Document>,
    /// The sidebar, empty when missing.
    pub sidebar: Sidebar,
    /// Site settings.
    pub settings: Option<SiteSettings>,
    /// Queries that failed while building this snapshot.
    pub failed: Vec<&'static str>,
}

impl PageSnapshot {
    /// Fetch the three records concurrently.
    ///
    /// Blocks until all three queries finish.
    pub fn fetch(source: &dyn ContentSource, slug: &str) -> Self {
        let (document, sidebar, settings) = thread::scope(|scope| {
            let document = scope.spawn(|| source.document(slug));
            let sidebar = scope.spawn(|| source.sidebar());
            let settings = scope.spawn(|| source.settings());
            (join(document), join(sidebar), join(settings))
        });

        let mut failed = Vec::new();
        let document = record("document", slug, document, &mut failed);
        let sidebar = record("sidebar", slug, sidebar, &mut failed).unwrap_or_default();
        let settings = record("settings", slug, settings, &mut failed);

        Self {
            document,
            sidebar,
            settings,
            failed,
        }
    }

    /// True when both required records are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.document.is_some() && self.settings.is_some()
    }

    /// True when at least one query failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failed.is_empty()
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

/// Unwrap a query result, logging and recording failures.
fn record<T>(
    query: &'static str,
    slug: &str,
    result: Result<Option<T>, ContentError>,
    failed: &mut Vec<&'static str>,
) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(query, slug = %slug, error = %e, "Content query failed");
            failed.push(query);
            None
        }
    }
}
