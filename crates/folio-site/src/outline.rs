//! Table of contents extraction.
//!
//! [`outline`] yields one [`OutlineEntry`] per heading block in document
//! order; [`nest`] folds those entries into a tree by heading level.

use folio_content::Block;
use serde::Serialize;

use crate::slug::slugify;

/// Heading in a document body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id, equal to the `id` attribute the body renderer emits.
    pub id: String,
}

/// Outline entry with its subheadings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    /// The heading.
    #[serde(flatten)]
    pub entry: OutlineEntry,
    /// Headings nested below it.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    fn leaf(entry: OutlineEntry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }
}

/// Heading entries of a body, lazily, in document order.
///
/// Non-heading blocks are skipped. Anchors are not deduplicated, so two
/// headings with the same slugified text share an id.
pub fn outline(body: &[Block]) -> impl Iterator<Item = OutlineEntry> + '_ {
    body.iter().filter_map(|block| {
        let Block::Text(text) = block else {
            return None;
        };
        let level = text.heading_level()?;
        let title = text.plain_text().trim().to_owned();
        Some(OutlineEntry {
            level,
            id: slugify(&title),
            title,
        })
    })
}

/// Fold flat entries into a tree.
///
/// Each heading becomes a child of the nearest open heading with a smaller
/// level. A heading at the same or a shallower level closes the open ones.
pub fn nest(entries: impl IntoIterator<Item = OutlineEntry>) -> Vec<OutlineNode> {
    let mut roots = Vec::new();
    let mut open: Vec<OutlineNode> = Vec::new();

    for entry in entries {
        while let Some(done) = open.pop_if(|top| top.entry.level >= entry.level) {
            attach(done, &mut open, &mut roots);
        }
        open.push(OutlineNode::leaf(entry));
    }
    while let Some(done) = open.pop() {
        attach(done, &mut open, &mut roots);
    }

    roots
}

fn attach(node: OutlineNode, open: &mut [OutlineNode], roots: &mut Vec<OutlineNode>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}
