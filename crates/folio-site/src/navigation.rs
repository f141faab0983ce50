//! Previous/next navigation across the sidebar.
//!
//! The sidebar defines the reading order: categories in order, then the items
//! inside each category. [`resolve`] finds the active document in that order
//! and returns its neighbours.

use std::collections::HashSet;

use folio_content::{DocRef, Sidebar};
use serde::Serialize;

/// Documents of a sidebar in reading order.
pub fn flatten(sidebar: &Sidebar) -> impl Iterator<Item = &DocRef> {
    sidebar
        .categories
        .iter()
        .flat_map(|category| category.items.iter())
}

/// Index of the first document with the given slug.
#[must_use]
pub fn locate(docs: &[&DocRef], slug: &str) -> Option<usize> {
    docs.iter().position(|doc| doc.slug.current == slug)
}

/// Neighbours of the active document.
///
/// All three are `None` when the active slug is not in the sidebar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigationContext<'a> {
    /// Document before the active one.
    pub previous: Option<&'a DocRef>,
    /// The active document's sidebar entry.
    pub active: Option<&'a DocRef>,
    /// Document after the active one.
    pub next: Option<&'a DocRef>,
}

/// Resolve previous/next for `active_slug`.
///
/// Slugs are expected to be unique; when one appears twice the first
/// occurrence wins.
#[must_use]
pub fn resolve<'a>(sidebar: &'a Sidebar, active_slug: &str) -> NavigationContext<'a> {
    let docs: Vec<&DocRef> = flatten(sidebar).collect();
    let Some(index) = locate(&docs, active_slug) else {
        return NavigationContext::default();
    };

    NavigationContext {
        previous: index.checked_sub(1).and_then(|i| docs.get(i).copied()),
        active: docs.get(index).copied(),
        next: docs.get(index + 1).copied(),
    }
}

/// Slugs that occur more than once, in order of their second occurrence.
#[must_use]
pub fn duplicate_slugs(sidebar: &Sidebar) -> Vec<&str> {
    let mut seen = HashSet::new();
    flatten(sidebar)
        .map(|doc| doc.slug.current.as_str())
        .filter(|slug| !seen.insert(*slug))
        .collect()
}

/// Link to a neighbouring document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    /// Document title.
    pub title: String,
    /// Document slug.
    pub slug: String,
    /// Site link (`/docs/{category}/{slug}`).
    pub href: String,
}

impl From<&DocRef> for NavEntry {
    fn from(doc: &DocRef) -> Self {
        Self {
            title: doc.title.clone(),
            slug: doc.slug.current.clone(),
            href: doc.href(),
        }
    }
}
