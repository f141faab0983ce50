//! Snapshot acquisition strategies.
//!
//! Every page render starts from a [`PageSnapshot`]. How that snapshot is
//! obtained is the only thing that differs between render modes:
//!
//! - [`OnDemand`] fetches on every request
//! - [`Precomputed`] serves stored snapshots and refetches once they age out
//!   of the revalidate window
//! - [`LiveSubscribed`] wraps another strategy and overlays draft content
//!
//! # Thread Safety
//!
//! All strategies are `Send + Sync`. [`Precomputed`] keeps its table behind
//! an `RwLock` and never holds the lock while fetching, so concurrent misses
//! for the same slug may fetch twice; the last write wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use folio_content::{ContentError, ContentErrorKind, ContentSource};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::navigation::flatten;
use crate::snapshot::PageSnapshot;

/// Pages fetched in parallel by [`Precomputed::prebuild`] unless configured.
pub const DEFAULT_PREBUILD_CONCURRENCY: usize = 8;

/// Source of page snapshots.
pub trait Acquire: Send + Sync {
    /// Snapshot for the document with the given slug.
    fn acquire(&self, slug: &str) -> Arc<PageSnapshot>;

    /// Drop stored snapshots: one slug, or all when `None`.
    ///
    /// Strategies that store nothing ignore this.
    fn invalidate(&self, _slug: Option<&str>) {}
}

/// Fetches a fresh snapshot for every request.
pub struct OnDemand {
    source: Arc<dyn ContentSource>,
}

impl OnDemand {
    /// Create a strategy fetching from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }
}

impl Acquire for OnDemand {
    fn acquire(&self, slug: &str) -> Arc<PageSnapshot> {
        Arc::new(PageSnapshot::fetch(self.source.as_ref(), slug))
    }
}

struct Entry {
    snapshot: Arc<PageSnapshot>,
    fetched_at: Instant,
}

impl Entry {
    fn new(snapshot: Arc<PageSnapshot>) -> Self {
        Self {
            snapshot,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, revalidate: Duration) -> bool {
        self.fetched_at.elapsed() < revalidate
    }
}

/// Only pages that render and whose queries all succeeded are stored.
fn is_storable(snapshot: &PageSnapshot) -> bool {
    snapshot.is_complete() && !snapshot.is_degraded()
}

/// Stored snapshots keyed by slug, refetched after the revalidate window.
///
/// Only complete snapshots whose queries all succeeded are stored, so the
/// table holds at most one entry per existing document. A refetch that fails
/// keeps serving the stored snapshot; the next access tries again. A refetch
/// that finds the document gone drops its entry.
pub struct Precomputed {
    source: Arc<dyn ContentSource>,
    revalidate: Duration,
    concurrency: usize,
    entries: RwLock<HashMap<String, Entry>>,
}

impl Precomputed {
    /// Create an empty table.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, revalidate: Duration) -> Self {
        Self {
            source,
            revalidate,
            concurrency: DEFAULT_PREBUILD_CONCURRENCY,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Set how many pages [`prebuild`](Self::prebuild) fetches in parallel.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Populate the table for every document listed in the sidebar.
    ///
    /// Pages are fetched on a thread pool of the configured concurrency.
    /// Returns the slugs that produced a storable snapshot, in sidebar order.
    ///
    /// # Errors
    ///
    /// Returns the sidebar query error, or an `Other` error if the thread
    /// pool cannot be created. Individual page failures are logged and
    /// skipped.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn prebuild(&self) -> Result<Vec<String>, ContentError> {
        let sidebar = self.source.sidebar()?.unwrap_or_default();

        let mut slugs: Vec<String> = Vec::new();
        for doc in flatten(&sidebar) {
            if !slugs.contains(&doc.slug.current) {
                slugs.push(doc.slug.current.clone());
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()
            .map_err(|e| ContentError::new(ContentErrorKind::Other).with_source(e))?;

        let snapshots: Vec<(String, PageSnapshot)> = pool.install(|| {
            slugs
                .par_iter()
                .map(|slug| (slug.clone(), PageSnapshot::fetch(self.source.as_ref(), slug)))
                .collect()
        });

        let mut built = Vec::with_capacity(snapshots.len());
        let mut entries = self.entries.write().unwrap();
        for (slug, snapshot) in snapshots {
            if !is_storable(&snapshot) {
                warn!(slug = %slug, failed = ?snapshot.failed, "Skipping incomplete page during prebuild");
                continue;
            }
            entries.insert(slug.clone(), Entry::new(Arc::new(snapshot)));
            built.push(slug);
        }

        info!(pages = built.len(), concurrency = self.concurrency, "Prebuilt pages");
        Ok(built)
    }

    /// Number of stored snapshots.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// True when nothing is stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Acquire for Precomputed {
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    fn acquire(&self, slug: &str) -> Arc<PageSnapshot> {
        let stale = {
            let entries = self.entries.read().unwrap();
            match entries.get(slug) {
                Some(entry) if entry.is_fresh(self.revalidate) => {
                    return Arc::clone(&entry.snapshot);
                }
                Some(entry) => Some(Arc::clone(&entry.snapshot)),
                None => None,
            }
        };

        let fetched = Arc::new(PageSnapshot::fetch(self.source.as_ref(), slug));

        if fetched.is_degraded() {
            if let Some(stale) = stale {
                debug!(slug = %slug, failed = ?fetched.failed, "Serving stale snapshot");
                return stale;
            }
            debug!(slug = %slug, failed = ?fetched.failed, "Not storing degraded snapshot");
            return fetched;
        }

        let mut entries = self.entries.write().unwrap();
        if is_storable(&fetched) {
            entries.insert(slug.to_owned(), Entry::new(Arc::clone(&fetched)));
        } else if entries.remove(slug).is_some() {
            debug!(slug = %slug, "Dropped snapshot of removed page");
        }
        fetched
    }

    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    fn invalidate(&self, slug: Option<&str>) {
        let mut entries = self.entries.write().unwrap();
        match slug {
            Some(slug) => {
                entries.remove(slug);
            }
            None => entries.clear(),
        }
        debug!(slug = ?slug, "Invalidated snapshots");
    }
}

/// Overlays draft content over a base snapshot.
///
/// The preview source is queried for the same three records. Each record it
/// returns replaces the base one; a record it does not return (an empty
/// sidebar counts as none) or fails to return keeps the base value.
pub struct LiveSubscribed {
    base: Arc<dyn Acquire>,
    preview: Arc<dyn ContentSource>,
}

impl LiveSubscribed {
    /// Wrap `base`, overlaying from `preview`.
    #[must_use]
    pub fn new(base: Arc<dyn Acquire>, preview: Arc<dyn ContentSource>) -> Self {
        Self { base, preview }
    }
}

impl Acquire for LiveSubscribed {
    fn acquire(&self, slug: &str) -> Arc<PageSnapshot> {
        let base = self.base.acquire(slug);
        let draft = PageSnapshot::fetch(self.preview.as_ref(), slug);
        if draft.is_degraded() {
            debug!(slug = %slug, failed = ?draft.failed, "Keeping initial data for failed preview queries");
        }

        let has_sidebar = !draft.sidebar.is_empty();
        if draft.document.is_none() && draft.settings.is_none() && !has_sidebar {
            return base;
        }

        let mut snapshot = PageSnapshot::clone(&base);
        if draft.document.is_some() {
            snapshot.document = draft.document;
        }
        if has_sidebar {
            snapshot.sidebar = draft.sidebar;
        }
        if draft.settings.is_some() {
            snapshot.settings = draft.settings;
        }
        Arc::new(snapshot)
    }

    fn invalidate(&self, slug: Option<&str>) {
        self.base.invalidate(slug);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use folio_content::{Category, DocRef, Document, MockSource, Sidebar, SiteSettings};

    use super::*;

    fn published() -> Arc<MockSource> {
        Arc::new(
            MockSource::new()
                .with_document(Document::new("intro", "Introduction"))
                .with_document(Document::new("install", "Installation"))
                .with_sidebar(Sidebar::new(vec![Category::new(
                    "basics",
                    "Basics",
                    vec![
                        DocRef::new("intro", "Introduction", "basics"),
                        DocRef::new("install", "Installation", "basics"),
                    ],
                )]))
                .with_settings(SiteSettings::new("Docs")),
        )
    }

    fn title(snapshot: &PageSnapshot) -> Option<&str> {
        snapshot.document.as_ref().map(|d| d.title.as_str())
    }

    /// Delays document queries and tracks how many run at once.
    struct SlowSource {
        inner: MockSource,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ContentSource for SlowSource {
        fn document(&self, slug: &str) -> Result<Option<Document>, ContentError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.inner.document(slug)
        }

        fn sidebar(&self) -> Result<Option<Sidebar>, ContentError> {
            self.inner.sidebar()
        }

        fn settings(&self) -> Result<Option<SiteSettings>, ContentError> {
            self.inner.settings()
        }
    }

    #[test]
    fn test_on_demand_fetches_every_time() {
        let source = published();
        let strategy = OnDemand::new(Arc::<MockSource>::clone(&source));

        strategy.acquire("intro");
        strategy.acquire("intro");

        assert_eq!(source.document_calls(), 2);
    }

    #[test]
    fn test_on_demand_invalidate_is_noop() {
        let source = published();
        let strategy = OnDemand::new(Arc::<MockSource>::clone(&source));

        strategy.invalidate(Some("intro"));
        strategy.invalidate(None);

        assert_eq!(title(&strategy.acquire("intro")), Some("Introduction"));
    }

    #[test]
    fn test_precomputed_serves_cached_within_window() {
        let source = published();
        let strategy = Precomputed::new(Arc::<MockSource>::clone(&source), Duration::from_secs(3600));

        let first = strategy.acquire("intro");
        source.set_document(Document::new("intro", "Changed"));
        let second = strategy.acquire("intro");

        assert_eq!(source.document_calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(title(&second), Some("Introduction"));
    }

    #[test]
    fn test_precomputed_refetches_after_window() {
        let source = published();
        let strategy = Precomputed::new(Arc::<MockSource>::clone(&source), Duration::ZERO);

        strategy.acquire("intro");
        source.set_document(Document::new("intro", "Changed"));
        let second = strategy.acquire("intro");

        assert_eq!(source.document_calls(), 2);
        assert_eq!(title(&second), Some("Changed"));
    }

    #[test]
    fn test_precomputed_keeps_stale_on_failure() {
        let healthy = published();
        let strategy = Precomputed::new(healthy, Duration::ZERO);
        let first = strategy.acquire("intro");

        // Swap the backend for one that fails on every query
        let broken = Arc::new(MockSource::new().failing("document").failing("settings"));
        let strategy = Precomputed {
            source: broken,
            ..strategy
        };
        let second = strategy.acquire("intro");

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_precomputed_does_not_store_missing_pages() {
        let source = published();
        let strategy = Precomputed::new(Arc::<MockSource>::clone(&source), Duration::from_secs(3600));

        for i in 0..100 {
            let snapshot = strategy.acquire(&format!("missing-{i}"));
            assert!(snapshot.document.is_none());
        }

        assert!(strategy.is_empty());
    }

    #[test]
    fn test_precomputed_drops_removed_page() {
        let source = published();
        let strategy = Precomputed::new(Arc::<MockSource>::clone(&source), Duration::ZERO);
        strategy.acquire("intro");
        assert_eq!(strategy.len(), 1);

        source.remove_document("intro");
        let snapshot = strategy.acquire("intro");

        assert!(snapshot.document.is_none());
        assert!(strategy.is_empty());
    }

    #[test]
    fn test_precomputed_retries_after_degraded_first_fetch() {
        let source = Arc::new(
            MockSource::new()
                .with_document(Document::new("intro", "Introduction"))
                .with_sidebar(Sidebar::new(vec![Category::new(
                    "basics",
                    "Basics",
                    vec![DocRef::new("intro", "Introduction", "basics")],
                )]))
                .with_settings(SiteSettings::new("Docs"))
                .failing("sidebar"),
        );
        let strategy = Precomputed::new(Arc::<MockSource>::clone(&source), Duration::from_secs(3600));

        let first = strategy.acquire("intro");
        assert!(first.sidebar.is_empty());
        assert!(strategy.is_empty());

        source.recover("sidebar");
        let second = strategy.acquire("intro");

        assert_eq!(second.sidebar.categories.len(), 1);
        assert_eq!(strategy.len(), 1);
    }

    #[test]
    fn test_precomputed_prebuild() {
        let source = published();
        let strategy = Precomputed::new(Arc::<MockSource>::clone(&source), Duration::from_secs(3600));

        let built = strategy.prebuild().unwrap();

        assert_eq!(built, vec!["intro", "install"]);
        assert_eq!(strategy.len(), 2);

        strategy.acquire("install");
        // Served from the table
        assert_eq!(source.document_calls(), 2);
    }

    #[test]
    fn test_precomputed_prebuild_bounded_concurrency() {
        let docs: Vec<DocRef> = (0..12)
            .map(|i| DocRef::new(&format!("page-{i}"), "Page", "all"))
            .collect();
        let mut inner = MockSource::new()
            .with_sidebar(Sidebar::new(vec![Category::new("all", "All", docs)]))
            .with_settings(SiteSettings::new("Docs"));
        for i in 0..12 {
            inner = inner.with_document(Document::new(&format!("page-{i}"), "Page"));
        }
        let source = Arc::new(SlowSource {
            inner,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let strategy = Precomputed::new(Arc::<SlowSource>::clone(&source), Duration::from_secs(3600))
            .with_concurrency(2);

        let built = strategy.prebuild().unwrap();

        assert_eq!(built.len(), 12);
        let peak = source.peak.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "peak concurrent fetches: {peak}");
    }

    #[test]
    fn test_precomputed_prebuild_skips_incomplete() {
        let source = published();
        source.remove_document("install");
        let strategy = Precomputed::new(source, Duration::from_secs(3600));

        let built = strategy.prebuild().unwrap();

        assert_eq!(built, vec!["intro"]);
    }

    #[test]
    fn test_precomputed_prebuild_sidebar_error() {
        let source = Arc::new(MockSource::new().failing("sidebar"));
        let strategy = Precomputed::new(source, Duration::from_secs(3600));

        assert!(strategy.prebuild().is_err());
        assert!(strategy.is_empty());
    }

    #[test]
    fn test_precomputed_invalidate() {
        let strategy = Precomputed::new(published(), Duration::from_secs(3600));
        strategy.prebuild().unwrap();

        strategy.invalidate(Some("intro"));
        assert_eq!(strategy.len(), 1);

        strategy.invalidate(None);
        assert!(strategy.is_empty());
    }

    #[test]
    fn test_live_overlays_newer_title() {
        let preview = Arc::new(MockSource::new().with_document(Document::new("intro", "Draft intro")));
        let strategy = LiveSubscribed::new(Arc::new(OnDemand::new(published())), preview);

        let snapshot = strategy.acquire("intro");

        assert_eq!(title(&snapshot), Some("Draft intro"));
        assert_eq!(snapshot.settings.as_ref().map(|s| s.title.as_str()), Some("Docs"));
        assert_eq!(snapshot.sidebar.categories.len(), 1);
    }

    #[test]
    fn test_live_overlays_draft_sidebar() {
        let preview = Arc::new(MockSource::new().with_sidebar(Sidebar::new(vec![Category::new(
            "basics",
            "Basics",
            vec![
                DocRef::new("intro", "Introduction", "basics"),
                DocRef::new("draft", "Draft page", "basics"),
            ],
        )])));
        let strategy = LiveSubscribed::new(Arc::new(OnDemand::new(published())), preview);

        let snapshot = strategy.acquire("intro");

        let slugs: Vec<&str> = flatten(&snapshot.sidebar)
            .map(|doc| doc.slug.current.as_str())
            .collect();
        assert_eq!(slugs, vec!["intro", "draft"]);
        assert_eq!(title(&snapshot), Some("Introduction"));
    }

    #[test]
    fn test_live_keeps_initial_data_when_preview_empty() {
        let base = Arc::new(OnDemand::new(published()));
        let strategy = LiveSubscribed::new(base, Arc::new(MockSource::new()));

        let snapshot = strategy.acquire("intro");

        assert_eq!(title(&snapshot), Some("Introduction"));
        assert_eq!(snapshot.sidebar.categories.len(), 1);
    }

    #[test]
    fn test_live_keeps_initial_data_when_preview_fails() {
        let base = Arc::new(OnDemand::new(published()));
        let preview = Arc::new(
            MockSource::new()
                .failing("document")
                .failing("sidebar")
                .failing("settings"),
        );
        let strategy = LiveSubscribed::new(base, preview);

        let snapshot = strategy.acquire("intro");

        assert_eq!(title(&snapshot), Some("Introduction"));
        assert_eq!(snapshot.sidebar.categories.len(), 1);
        assert!(snapshot.failed.is_empty());
    }

    #[test]
    fn test_live_shows_draft_only_document() {
        let preview = Arc::new(MockSource::new().with_document(Document::new("new-page", "Draft")));
        let strategy = LiveSubscribed::new(Arc::new(OnDemand::new(published())), preview);

        let snapshot = strategy.acquire("new-page");

        assert_eq!(title(&snapshot), Some("Draft"));
        assert!(snapshot.is_complete());
    }

    #[test]
    fn test_live_invalidate_reaches_base() {
        let base = Arc::new(Precomputed::new(published(), Duration::from_secs(3600)));
        base.prebuild().unwrap();
        let strategy = LiveSubscribed::new(Arc::<Precomputed>::clone(&base), Arc::new(MockSource::new()));

        strategy.invalidate(None);

        assert!(base.is_empty());
    }
}
