// HTML document mount point.
// Finds an element by id in an HTML page and replaces its inner content.

use std::ops::Range;

use super::COMMITS_LIST_ID;
use super::cards::escape_html;
use crate::error::{Result, ViewError};

/// Something commit markup can be mounted into.
pub trait RenderTarget: Send {
    /// Replace the entire inner content of the element with the given id.
    fn replace_inner(&mut self, id: &str, html: &str) -> Result<()>;
}

/// An HTML page held in memory.
///
/// Elements are located by a lightweight tag scan, not a full HTML parser.
/// Comments and the contents of `<script>` and `<style>` are skipped, and `>`
/// inside quoted attribute values is honoured. The id must be written as a
/// quoted `id` attribute, and an unquoted value containing a quote character
/// will confuse the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    source: String,
}

impl HtmlDocument {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// A minimal page with an empty commits list under a heading.
    pub fn page(title: &str) -> Self {
        let title = escape_html(title);
        Self::new(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/materialize/1.0.0/css/materialize.min.css">
</head>
<body>
  <div class="container">
    <h1>{title}</h1>
    <div id="{COMMITS_LIST_ID}"></div>
  </div>
</body>
</html>
"#
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Current inner content of the element with the given id.
    pub fn inner_html(&self, id: &str) -> Result<&str> {
        let range = self.locate(id)?;
        Ok(&self.source[range])
    }

    /// Byte range of the inner content of the element with the given id.
    fn locate(&self, id: &str) -> Result<Range<usize>> {
        let tags = scan_tags(&self.source);
        let (index, open) = tags
            .iter()
            .enumerate()
            .find(|(_, tag)| !tag.closing && has_id(&self.source[tag.range.clone()], id))
            .ok_or_else(|| ViewError::MountNotFound(id.to_string()))?;
        if open.self_closing {
            return Err(ViewError::MountNotFound(id.to_string()));
        }

        let mut depth = 1usize;
        for tag in &tags[index + 1..] {
            if !tag.name.eq_ignore_ascii_case(open.name) {
                continue;
            }
            if tag.closing {
                depth -= 1;
                if depth == 0 {
                    return Ok(open.range.end..tag.range.start);
                }
            } else if !tag.self_closing {
                depth += 1;
            }
        }

        Err(ViewError::Other(format!("Element #{} is never closed", id)))
    }
}

impl RenderTarget for HtmlDocument {
    fn replace_inner(&mut self, id: &str, html: &str) -> Result<()> {
        let range = self.locate(id)?;
        self.source.replace_range(range, html);
        Ok(())
    }
}

/// A start or end tag found in the document.
struct Tag<'a> {
    /// From `<` through `>`.
    range: Range<usize>,
    name: &'a str,
    closing: bool,
    self_closing: bool,
}

/// All start and end tags of `source`, in document order.
fn scan_tags(source: &str) -> Vec<Tag<'_>> {
    let bytes = source.as_bytes();
    let mut tags = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find('<') {
        let start = cursor + offset;
        let rest = &source[start + 1..];

        if let Some(comment) = rest.strip_prefix("!--") {
            cursor = match comment.find("-->") {
                Some(end) => start + 4 + end + 3,
                None => source.len(),
            };
            continue;
        }

        let closing = rest.starts_with('/');
        let name_start = if closing { start + 2 } else { start + 1 };
        let name_len = tag_name(&bytes[name_start..]).len();
        if name_len == 0 {
            // Doctype, processing instruction, or a stray `<`
            cursor = start + 1;
            continue;
        }
        let Some(end) = tag_end(bytes, name_start + name_len) else {
            break;
        };

        let name = &source[name_start..name_start + name_len];
        tags.push(Tag {
            range: start..end + 1,
            name,
            closing,
            self_closing: !closing && bytes[end - 1] == b'/',
        });
        cursor = end + 1;

        if !closing && (name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")) {
            let close = format!("</{}", name.to_ascii_lowercase());
            match source[cursor..].to_ascii_lowercase().find(&close) {
                Some(offset) => cursor += offset,
                None => break,
            }
        }
    }

    tags
}

/// Index of the `>` closing a tag, skipping quoted attribute values.
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Whether a start tag carries a quoted `id` attribute equal to `id`.
fn has_id(tag: &str, id: &str) -> bool {
    let bytes = tag.as_bytes();
    ['"', '\''].iter().any(|quote| {
        let needle = format!("id={quote}{id}{quote}");
        tag.match_indices(&needle)
            .any(|(pos, _)| pos > 0 && bytes[pos - 1].is_ascii_whitespace())
    })
}

/// Leading tag name of `rest` (the bytes right after `<` or `</`).
fn tag_name(rest: &[u8]) -> &[u8] {
    let len = rest
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
        .count();
    &rest[..len]
}
