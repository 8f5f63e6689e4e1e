//! Deferred placeholders.
//!
//! Shortcodes that need the site index (internal links, related content)
//! cannot produce final HTML during the per-item pass. They emit a placeholder
//! element instead, which survives Markdown rendering untouched as raw HTML and
//! is substituted once the index exists:
//!
//! ```text
//! <quire-link data-shortname="alpha" data-text="See this"></quire-link>
//! <quire-related data-limit="5"></quire-related>
//! ```
//!
//! Attribute values are HTML-escaped, so they never contain a raw `"` or `>`.

use std::ops::Range;

use crate::escape::{escape_html, unescape_html};

const LINK_TAG: &str = "quire-link";
const RELATED_TAG: &str = "quire-related";

/// A reference left in first-pass output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// Internal link by shortname, with optional display text.
    Link {
        shortname: String,
        text: Option<String>,
    },
    /// Related-content list, with optional size override.
    Related { limit: Option<usize> },
}

impl Placeholder {
    /// Serialize as a placeholder element.
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Link { shortname, text } => {
                let mut html = format!(
                    r#"<{LINK_TAG} data-shortname="{}""#,
                    escape_html(shortname)
                );
                if let Some(text) = text {
                    html.push_str(&format!(r#" data-text="{}""#, escape_html(text)));
                }
                html.push_str(&format!("></{LINK_TAG}>"));
                html
            }
            Self::Related { limit: Some(limit) } => {
                format!(r#"<{RELATED_TAG} data-limit="{limit}"></{RELATED_TAG}>"#)
            }
            Self::Related { limit: None } => format!("<{RELATED_TAG}></{RELATED_TAG}>"),
        }
    }

    /// Find the first well-formed placeholder at or after `from`.
    ///
    /// Returns the placeholder and its byte range in `html`. Text that merely
    /// looks like a placeholder but does not parse is skipped.
    #[must_use]
    pub fn find(html: &str, from: usize) -> Option<(Self, Range<usize>)> {
        let mut search = from;
        while let Some(rel) = html.get(search..)?.find("<quire-") {
            let start = search + rel;
            if let Some((placeholder, len)) = parse_at(&html[start..]) {
                return Some((placeholder, start..start + len));
            }
            search = start + 1;
        }
        None
    }
}

/// Shortnames referenced by link placeholders, in order of first appearance.
#[must_use]
pub fn link_targets(html: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    let mut pos = 0;
    while let Some((placeholder, range)) = Placeholder::find(html, pos) {
        if let Placeholder::Link { shortname, .. } = placeholder
            && !targets.contains(&shortname)
        {
            targets.push(shortname);
        }
        pos = range.end;
    }
    targets
}

/// Parse a placeholder element at the start of `s`.
fn parse_at(s: &str) -> Option<(Placeholder, usize)> {
    let rest = s.strip_prefix('<')?;
    let tag = [LINK_TAG, RELATED_TAG]
        .into_iter()
        .find(|tag| rest.starts_with(tag) && matches!(rest.as_bytes().get(tag.len()), Some(b' ' | b'>')))?;

    let open_end = rest.find('>')?;
    let attrs = parse_attributes(&rest[tag.len()..open_end])?;
    let closing = format!("</{tag}>");
    let after_open = &rest[open_end + 1..];
    if !after_open.starts_with(&closing) {
        return None;
    }
    let len = 1 + open_end + 1 + closing.len();

    let get = |name: &str| {
        attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let placeholder = if tag == LINK_TAG {
        Placeholder::Link {
            shortname: get("data-shortname")?,
            text: get("data-text"),
        }
    } else {
        let limit = match get("data-limit") {
            Some(value) => Some(value.parse().ok()?),
            None => None,
        };
        Placeholder::Related { limit }
    };

    Some((placeholder, len))
}

/// Parse ` name="value" name="value"` into unescaped pairs.
fn parse_attributes(s: &str) -> Option<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        let eq = rest.find("=\"")?;
        let name = &rest[..eq];
        let value_start = &rest[eq + 2..];
        let end = value_start.find('"')?;
        attrs.push((name.to_owned(), unescape_html(&value_start[..end])));
        rest = value_start[end + 1..].trim_start();
    }
    Some(attrs)
}
