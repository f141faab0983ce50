//! Typed records returned by the content backend.
//!
//! Field names follow the backend's JSON (`_id`, `slug.current`, `markDefs`),
//! so records deserialize straight from query results and serialize back in
//! the same shape for the presentation layer.

use serde::{Deserialize, Serialize};

/// URL-safe identifier wrapper as stored by the backend (`{"current": "..."}`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    /// Current slug value.
    pub current: String,
}

impl From<&str> for Slug {
    fn from(value: &str) -> Self {
        Self {
            current: value.to_owned(),
        }
    }
}

/// Reference from a document to the category that owns it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category title.
    #[serde(default)]
    pub title: String,
    /// Category slug.
    pub slug: Slug,
}

/// A documentation page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Backend document id.
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Page title.
    pub title: String,
    /// Page slug.
    pub slug: Slug,
    /// Rich-content body.
    #[serde(default)]
    pub body: Vec<Block>,
    /// Owning category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    /// Last update timestamp (RFC 3339).
    #[serde(rename = "_updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Document {
    /// Create a document with an empty body and no category.
    #[must_use]
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            id: slug.to_owned(),
            title: title.to_owned(),
            slug: slug.into(),
            body: Vec::new(),
            category: None,
            updated_at: None,
        }
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<Block>) -> Self {
        self.body = body;
        self
    }

    /// Set the owning category.
    #[must_use]
    pub fn with_category(mut self, slug: &str, title: &str) -> Self {
        self.category = Some(CategoryRef {
            title: title.to_owned(),
            slug: slug.into(),
        });
        self
    }
}

/// One block of a document body.
///
/// Block types this crate does not know about deserialize to
/// [`Block::Unknown`] instead of failing the whole document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    /// Text block: paragraph, heading, quote or list item.
    #[serde(rename = "block")]
    Text(TextBlock),
    /// Code listing.
    #[serde(rename = "code")]
    Code(CodeBlock),
    /// Image.
    #[serde(rename = "image")]
    Image(ImageBlock),
    /// Any other block type.
    #[serde(other)]
    Unknown,
}

impl Block {
    /// Heading block with a single unmarked span.
    ///
    /// # Panics
    ///
    /// Panics if `level` is not in `1..=6`.
    #[must_use]
    pub fn heading(level: u8, text: &str) -> Self {
        assert!((1..=6).contains(&level), "heading level out of range");
        Self::Text(TextBlock::new(&format!("h{level}"), text))
    }

    /// Plain paragraph with a single unmarked span.
    #[must_use]
    pub fn paragraph(text: &str) -> Self {
        Self::Text(TextBlock::new("normal", text))
    }

    /// Code block.
    #[must_use]
    pub fn code(language: Option<&str>, code: &str) -> Self {
        Self::Code(CodeBlock {
            language: language.map(ToOwned::to_owned),
            code: code.to_owned(),
            filename: None,
        })
    }
}

fn default_style() -> String {
    "normal".to_owned()
}

/// Text block made of marked-up spans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block style: `normal`, `h1`..`h6`, `blockquote`.
    #[serde(default = "default_style")]
    pub style: String,
    /// Inline spans.
    #[serde(default)]
    pub children: Vec<Span>,
    /// Annotation definitions referenced from span marks.
    #[serde(rename = "markDefs", default)]
    pub mark_defs: Vec<MarkDef>,
    /// List type when the block is a list item (`bullet` or `number`).
    #[serde(rename = "listItem", default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<String>,
    /// List nesting level (1-based).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl TextBlock {
    /// Block with the given style and one unmarked span.
    #[must_use]
    pub fn new(style: &str, text: &str) -> Self {
        Self {
            style: style.to_owned(),
            children: vec![Span {
                text: text.to_owned(),
                marks: Vec::new(),
            }],
            mark_defs: Vec::new(),
            list_item: None,
            level: None,
        }
    }

    /// Heading level read from the style tag (`h1` → 1), `None` for non-headings.
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        let digit = self.style.strip_prefix('h')?;
        match digit.parse::<u8>() {
            Ok(level @ 1..=6) => Some(level),
            _ => None,
        }
    }

    /// Concatenated text of all spans.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }

    /// Look up an annotation by its key.
    #[must_use]
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

/// Inline run of text with decorator and annotation marks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Span text.
    #[serde(default)]
    pub text: String,
    /// Decorators (`strong`, `em`, `code`, ...) or keys into `markDefs`.
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation definition (e.g. a link).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDef {
    /// Key referenced from span marks.
    #[serde(rename = "_key")]
    pub key: String,
    /// Annotation type (`link`, ...).
    #[serde(rename = "_type")]
    pub kind: String,
    /// Link target for `link` annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Code listing block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language hint for highlighting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Source text.
    #[serde(default)]
    pub code: String,
    /// Optional file name shown above the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Image block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Resolved asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<ImageAsset>,
    /// Alternative text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Caption shown below the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Image asset reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Public URL (present when the query dereferences the asset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Sidebar entry pointing at a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRef {
    /// Document title.
    pub title: String,
    /// Document slug.
    pub slug: Slug,
    /// Category the document belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl DocRef {
    /// Create a reference to a document in the given category.
    #[must_use]
    pub fn new(slug: &str, title: &str, category_slug: &str) -> Self {
        Self {
            title: title.to_owned(),
            slug: slug.into(),
            category: Some(CategoryRef {
                title: String::new(),
                slug: category_slug.into(),
            }),
        }
    }

    /// Site link for the document: `/docs/{category}/{slug}`.
    ///
    /// Documents without a category link to `/docs/{slug}`.
    #[must_use]
    pub fn href(&self) -> String {
        match &self.category {
            Some(category) if !category.slug.current.is_empty() => {
                format!("/docs/{}/{}", category.slug.current, self.slug.current)
            }
            _ => format!("/docs/{}", self.slug.current),
        }
    }
}

/// Sidebar category with its ordered documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category title.
    pub title: String,
    /// Category slug.
    pub slug: Slug,
    /// Documents in display order.
    #[serde(default)]
    pub items: Vec<DocRef>,
}

impl Category {
    /// Create a category.
    #[must_use]
    pub fn new(slug: &str, title: &str, items: Vec<DocRef>) -> Self {
        Self {
            title: title.to_owned(),
            slug: slug.into(),
            items,
        }
    }
}

/// Ordered categories; concatenating their items gives the site reading order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sidebar {
    /// Categories in display order.
    pub categories: Vec<Category>,
}

impl Sidebar {
    /// Create a sidebar from categories.
    #[must_use]
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// True when there are no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Social profile link shown in the site footer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Network name.
    pub media: String,
    /// Profile URL.
    pub url: String,
}

/// Site-wide settings document.
///
/// Fields the presentation layer may need but this crate does not interpret
/// are kept in `extra` and serialized back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Site title.
    #[serde(default)]
    pub title: String,
    /// Site description for meta tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Canonical site URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Footer copyright line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    /// Social links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub social: Vec<SocialLink>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SiteSettings {
    /// Settings with only a title.
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_document_deserialize_backend_shape() {
        let value = json!({
            "_id": "doc-1",
            "_updatedAt": "2024-03-01T12:00:00Z",
            "title": "Installation",
            "slug": {"current": "installation"},
            "category": {"title": "Getting Started", "slug": {"current": "getting-started"}},
            "body": [
                {"_type": "block", "_key": "a", "style": "h2",
                 "children": [{"_type": "span", "text": "Requirements", "marks": []}],
                 "markDefs": []},
                {"_type": "code", "language": "sh", "code": "npm install"},
                {"_type": "callout", "tone": "warning"}
            ]
        });

        let doc: Document = serde_json::from_value(value).unwrap();

        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.slug.current, "installation");
        assert_eq!(doc.updated_at.as_deref(), Some("2024-03-01T12:00:00Z"));
        assert_eq!(
            doc.category.as_ref().map(|c| c.slug.current.as_str()),
            Some("getting-started")
        );
        assert_eq!(doc.body.len(), 3);
        assert!(matches!(&doc.body[0], Block::Text(b) if b.heading_level() == Some(2)));
        assert!(matches!(&doc.body[1], Block::Code(c) if c.code == "npm install"));
        assert_eq!(doc.body[2], Block::Unknown);
    }

    #[test]
    fn test_document_missing_body_defaults_empty() {
        let doc: Document = serde_json::from_value(json!({
            "title": "Empty",
            "slug": {"current": "empty"}
        }))
        .unwrap();

        assert!(doc.body.is_empty());
        assert!(doc.category.is_none());
    }

    #[test]
    fn test_text_block_defaults_to_normal_style() {
        let block: Block = serde_json::from_value(json!({
            "_type": "block",
            "children": [{"text": "Hello"}]
        }))
        .unwrap();

        let Block::Text(text) = block else {
            panic!("expected text block");
        };
        assert_eq!(text.style, "normal");
        assert_eq!(text.heading_level(), None);
        assert_eq!(text.plain_text(), "Hello");
    }

    #[test]
    fn test_heading_level_parsing() {
        assert_eq!(TextBlock::new("h1", "").heading_level(), Some(1));
        assert_eq!(TextBlock::new("h6", "").heading_level(), Some(6));
        assert_eq!(TextBlock::new("h7", "").heading_level(), None);
        assert_eq!(TextBlock::new("h0", "").heading_level(), None);
        assert_eq!(TextBlock::new("hero", "").heading_level(), None);
        assert_eq!(TextBlock::new("blockquote", "").heading_level(), None);
    }

    #[test]
    fn test_plain_text_joins_spans() {
        let block = TextBlock {
            children: vec![
                Span {
                    text: "Run ".to_owned(),
                    marks: vec![],
                },
                Span {
                    text: "cargo".to_owned(),
                    marks: vec!["code".to_owned()],
                },
            ],
            ..TextBlock::new("normal", "")
        };

        assert_eq!(block.plain_text(), "Run cargo");
    }

    #[test]
    fn test_doc_ref_href() {
        let doc = DocRef::new("installation", "Installation", "getting-started");
        assert_eq!(doc.href(), "/docs/getting-started/installation");

        let orphan = DocRef {
            category: None,
            ..doc
        };
        assert_eq!(orphan.href(), "/docs/installation");
    }

    #[test]
    fn test_sidebar_is_transparent_array() {
        let sidebar: Sidebar = serde_json::from_value(json!([
            {"title": "Basics", "slug": {"current": "basics"}, "items": [
                {"title": "Intro", "slug": {"current": "intro"},
                 "category": {"title": "Basics", "slug": {"current": "basics"}}}
            ]},
            {"title": "Empty", "slug": {"current": "empty"}}
        ]))
        .unwrap();

        assert_eq!(sidebar.categories.len(), 2);
        assert_eq!(sidebar.categories[0].items[0].slug.current, "intro");
        assert!(sidebar.categories[1].items.is_empty());
        assert_eq!(serde_json::to_value(&sidebar).unwrap()[0]["title"], "Basics");
    }

    #[test]
    fn test_site_settings_keeps_extra_fields() {
        let settings: SiteSettings = serde_json::from_value(json!({
            "_id": "siteconfig",
            "title": "Folio Docs",
            "w3ckey": "abc",
            "social": [{"media": "github", "url": "https://github.com/example"}]
        }))
        .unwrap();

        assert_eq!(settings.title, "Folio Docs");
        assert_eq!(settings.social.len(), 1);
        assert_eq!(settings.extra["w3ckey"], "abc");

        let back = serde_json::to_value(&settings).unwrap();
        assert_eq!(back["w3ckey"], "abc");
        assert_eq!(back["_id"], "siteconfig");
    }
}
