//! Second pass: placeholder substitution.
//!
//! Link placeholders become anchors to the target item; related placeholders
//! become lists of related items. The output depends on the whole site index
//! and is never cached.

use std::path::Path;

use quire_shortcodes::{Placeholder, escape_html};

use crate::error::Warning;
use crate::index::{IndexEntry, SiteIndex};

/// Resolved body of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub html: String,
    pub warnings: Vec<Warning>,
}

/// Substitutes placeholders against a completed [`SiteIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a SiteIndex,
    related_limit: usize,
    relative_links: bool,
}

impl<'a> Resolver<'a> {
    /// Create a resolver; `related_limit` applies to `related` tags without
    /// an explicit limit.
    #[must_use]
    pub fn new(index: &'a SiteIndex, related_limit: usize) -> Self {
        Self {
            index,
            related_limit,
            relative_links: false,
        }
    }

    /// Emit hrefs relative to the linking item's URL.
    #[must_use]
    pub fn with_relative_links(mut self, relative: bool) -> Self {
        self.relative_links = relative;
        self
    }

    /// Resolve the first-pass `html` of item `id`.
    ///
    /// `dependencies` are the shortnames recorded for the body; each one
    /// missing from the index yields a single [`Warning::BrokenLink`].
    #[must_use]
    pub fn resolve(
        &self,
        id: usize,
        path: &Path,
        html: &str,
        dependencies: &[String],
    ) -> Resolved {
        let warnings = dependencies
            .iter()
            .filter(|shortname| self.index.by_shortname(shortname).is_none())
            .map(|shortname| {
                tracing::warn!(
                    path = %path.display(),
                    shortname = %shortname,
                    "Broken internal link"
                );
                Warning::BrokenLink {
                    path: path.to_path_buf(),
                    shortname: shortname.clone(),
                }
            })
            .collect();

        let current_url = self.index.get(id).map_or("/", |entry| entry.url.as_str());
        let mut output = String::with_capacity(html.len());
        let mut pos = 0;

        while let Some((placeholder, range)) = Placeholder::find(html, pos) {
            output.push_str(&html[pos..range.start]);
            pos = range.end;
            match &placeholder {
                Placeholder::Link { shortname, text } => {
                    output.push_str(&self.link(current_url, shortname, text.as_deref()));
                }
                Placeholder::Related { limit } => {
                    let limit = limit.unwrap_or(self.related_limit);
                    let list = self.related(id, current_url, limit);
                    if in_paragraph(&html[..range.start]) {
                        // A list cannot sit inside <p>: split the paragraph
                        // around it, dropping halves left empty.
                        if output.ends_with("<p>") {
                            output.truncate(output.len() - "<p>".len());
                        } else {
                            output.push_str("</p>\n");
                        }
                        output.push_str(&list);
                        if html[pos..].starts_with("</p>") {
                            pos += "</p>".len();
                        } else {
                            output.push_str("<p>");
                        }
                    } else {
                        output.push_str(&list);
                    }
                }
            }
        }
        output.push_str(&html[pos..]);

        Resolved {
            html: output,
            warnings,
        }
    }

    fn link(&self, current_url: &str, shortname: &str, text: Option<&str>) -> String {
        match self.index.by_shortname(shortname) {
            Some(target) => {
                let text = text.unwrap_or(&target.title);
                format!(
                    r#"<a href="{}">{}</a>"#,
                    escape_html(&self.href(current_url, target)),
                    escape_html(text)
                )
            }
            None => format!(
                r#"<span class="broken-link">{}</span>"#,
                escape_html(text.unwrap_or(shortname))
            ),
        }
    }

    fn related(&self, id: usize, current_url: &str, limit: usize) -> String {
        let related = self.index.related(id, limit);
        if related.is_empty() {
            return String::new();
        }
        let mut html = String::from("<ul class=\"related\">\n");
        for entry in related {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_html(&self.href(current_url, entry)),
                escape_html(&entry.title)
            ));
        }
        html.push_str("</ul>\n");
        html
    }

    fn href(&self, current_url: &str, target: &IndexEntry) -> String {
        if self.relative_links {
            relative_url(current_url, &target.url)
        } else {
            target.url.clone()
        }
    }
}

/// Whether `html` ends inside an open `<p>` element.
fn in_paragraph(html: &str) -> bool {
    match (html.rfind("<p>"), html.rfind("</p>")) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Compute a relative URL from one site path to another.
///
/// Both are directory-style paths (`/posts/a/`); the result keeps the
/// trailing slash of `to`.
fn relative_url(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    // Without a trailing slash the last segment is a document, not a directory.
    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = "../".repeat(from_dir.len() - common);
    result.push_str(&to_segs[common..].join("/"));
    if result.is_empty() {
        return "./".to_owned();
    }
    if to.ends_with('/') && !result.ends_with('/') {
        result.push('/');
    }
    result
}
