//! Rich-content body to HTML.
//!
//! Headings get the same anchor ids [`outline`](crate::outline::outline)
//! computes, so table of contents links land on them. This includes list
//! items styled as headings, whose `<li>` carries the id. Consecutive list
//! items are grouped into `<ul>`/`<ol>` elements nested by their `level`.
//!
//! Link annotations keep only `http`, `https`, `mailto` and `tel` URLs and
//! relative references; any other scheme renders the text without a link.

use std::fmt::Write;

use folio_content::{Block, CodeBlock, ImageBlock, Span, TextBlock};

use crate::slug::{escape_html, slugify};

/// Render a document body to HTML.
#[must_use]
pub fn render_html(body: &[Block]) -> String {
    let mut out = String::new();
    let mut lists = ListStack::default();

    for block in body {
        match block {
            Block::Text(text) if text.list_item.is_some() => lists.item(&mut out, text),
            Block::Text(text) => {
                lists.close_all(&mut out);
                render_text(&mut out, text);
            }
            Block::Code(code) => {
                lists.close_all(&mut out);
                render_code(&mut out, code);
            }
            Block::Image(image) => {
                lists.close_all(&mut out);
                render_image(&mut out, image);
            }
            Block::Unknown => {}
        }
    }
    lists.close_all(&mut out);

    out
}

/// Anchor id of a heading block, matching its outline entry.
fn heading_id(block: &TextBlock) -> Option<String> {
    block
        .heading_level()
        .map(|_| slugify(block.plain_text().trim()))
}

fn render_text(out: &mut String, block: &TextBlock) {
    let inline = render_inline(block);
    if let (Some(level), Some(id)) = (block.heading_level(), heading_id(block)) {
        let _ = write!(out, r#"<h{level} id="{id}">{inline}</h{level}>"#);
        return;
    }
    match block.style.as_str() {
        "blockquote" => {
            let _ = write!(out, "<blockquote>{inline}</blockquote>");
        }
        _ => {
            let _ = write!(out, "<p>{inline}</p>");
        }
    }
}

fn render_code(out: &mut String, code: &CodeBlock) {
    out.push_str("<pre");
    if let Some(filename) = &code.filename {
        let _ = write!(out, r#" data-filename="{}""#, escape_html(filename));
    }
    out.push_str("><code");
    if let Some(language) = &code.language {
        let _ = write!(out, r#" class="language-{}""#, escape_html(language));
    }
    let _ = write!(out, ">{}</code></pre>", escape_html(&code.code));
}

fn render_image(out: &mut String, image: &ImageBlock) {
    let Some(url) = image.asset.as_ref().and_then(|asset| asset.url.as_deref()) else {
        return;
    };
    let alt = image.alt.as_deref().unwrap_or_default();
    let _ = write!(
        out,
        r#"<figure><img src="{}" alt="{}">"#,
        escape_html(url),
        escape_html(alt)
    );
    if let Some(caption) = &image.caption {
        let _ = write!(out, "<figcaption>{}</figcaption>", escape_html(caption));
    }
    out.push_str("</figure>");
}

/// Render the spans of a block with their marks.
fn render_inline(block: &TextBlock) -> String {
    let mut out = String::new();
    for span in &block.children {
        render_span(&mut out, block, span);
    }
    out
}

fn render_span(out: &mut String, block: &TextBlock, span: &Span) {
    let mut closing = Vec::with_capacity(span.marks.len());

    for mark in &span.marks {
        let (open, close) = match mark.as_str() {
            "strong" => ("<strong>".to_owned(), "</strong>"),
            "em" => ("<em>".to_owned(), "</em>"),
            "code" => ("<code>".to_owned(), "</code>"),
            "underline" => ("<u>".to_owned(), "</u>"),
            "strike-through" => ("<s>".to_owned(), "</s>"),
            key => match block.mark_def(key) {
                Some(def) if def.kind == "link" => match def.href.as_deref().and_then(safe_href) {
                    Some(href) => (format!(r#"<a href="{}">"#, escape_html(href)), "</a>"),
                    None => continue,
                },
                // Unknown decorators and annotations render as plain text
                _ => continue,
            },
        };
        out.push_str(&open);
        closing.push(close);
    }

    out.push_str(&escape_html(&span.text));

    for close in closing.iter().rev() {
        out.push_str(close);
    }
}

/// The link target if it is safe to emit.
///
/// A reference without a scheme is relative. A `:` after a `/`, `?` or `#`
/// belongs to the path, query or fragment, not to a scheme.
fn safe_href(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match href.find([':', '/', '?', '#']) {
        Some(end) if href[end..].starts_with(':') => {
            let scheme = href[..end].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto" | "tel").then_some(href)
        }
        _ => Some(href),
    }
}

/// Open lists, innermost last. Every open list has exactly one open `<li>`.
#[derive(Default)]
struct ListStack {
    open: Vec<(&'static str, u8)>,
}

impl ListStack {
    fn item(&mut self, out: &mut String, block: &TextBlock) {
        let tag = match block.list_item.as_deref() {
            Some("number") => "ol",
            _ => "ul",
        };
        let level = block.level.unwrap_or(1).max(1);

        while let Some((closed, _)) = self
            .open
            .pop_if(|(open_tag, open_level)| *open_level > level || (*open_level == level && *open_tag != tag))
        {
            let _ = write!(out, "</li></{closed}>");
        }

        match self.open.last() {
            Some((_, open_level)) if *open_level == level => out.push_str("</li>"),
            _ => {
                let _ = write!(out, "<{tag}>");
                self.open.push((tag, level));
            }
        }

        match heading_id(block) {
            Some(id) => {
                let _ = write!(out, r#"<li id="{id}">{}"#, render_inline(block));
            }
            None => {
                let _ = write!(out, "<li>{}", render_inline(block));
            }
        }
    }

    fn close_all(&mut self, out: &mut String) {
        while let Some((tag, _)) = self.open.pop() {
            let _ = write!(out, "</li></{tag}>");
        }
    }
}
