//! GROQ queries and query URL construction.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Single document by slug, with its category dereferenced.
pub const DOCUMENT_BY_SLUG: &str = r#"*[_type == "docs" && slug.current == $slug][0] {
  _id, _updatedAt, title, slug, category->{ title, slug },
  body[] { ..., _type == "image" => { ..., asset->{ url } } }
}"#;

/// Every category with its documents, both in editorial order.
pub const SIDEBAR: &str = r#"*[_type == "category"] | order(order asc, title asc) {
  title, slug,
  "items": *[_type == "docs" && references(^._id)] | order(order asc, title asc) {
    title, slug, category->{ title, slug }
  }
}"#;

/// The site settings singleton.
pub const SETTINGS: &str = r#"*[_type == "settings"][0]"#;

/// Characters left unescaped in query string values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Which revision of each document a query sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Perspective {
    /// Published documents only.
    Published,
    /// Drafts overlaid on published documents.
    Drafts,
}

impl Perspective {
    /// Pick the perspective for a request.
    #[must_use]
    pub fn for_preview(preview: bool) -> Self {
        if preview { Self::Drafts } else { Self::Published }
    }

    fn as_param(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Drafts => "previewDrafts",
        }
    }
}

/// Build the full query URL.
///
/// Parameters are JSON-encoded and passed as `$name=...`, the way GROQ
/// expects them. Perspectives are only understood by dated API versions.
pub(crate) fn query_url(
    base_url: &str,
    api_version: &str,
    dataset: &str,
    perspective: Perspective,
    query: &str,
    params: &[(&str, &str)],
) -> String {
    let mut url = format!(
        "{base_url}/v{api_version}/data/query/{dataset}?query={}",
        utf8_percent_encode(query, QUERY_VALUE)
    );

    for (name, value) in params {
        let json = serde_json::Value::String((*value).to_owned()).to_string();
        url.push_str(&format!(
            "&%24{name}={}",
            utf8_percent_encode(&json, QUERY_VALUE)
        ));
    }

    if api_version != "1" {
        url.push_str("&perspective=");
        url.push_str(perspective.as_param());
    }

    url
}
