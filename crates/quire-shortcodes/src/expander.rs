//! Shortcode expansion.
//!
//! Scans a Markdown body left to right, replaces every shortcode tag outside
//! fenced code blocks with the fragment its definition renders, and splices
//! block bodies (expanded first) into the invocation's arguments.
//!
//! Expansion is not applied to its own output: any `{{<` a fragment contains
//! is escaped before being spliced in, unless it sits in a code fence that
//! still opens at the start of a line once spliced.

use std::collections::BTreeSet;
use std::ops::Range;
use std::path::Path;

use crate::definition::{BindError, BodyMode, ShortcodeContext};
use crate::error::{ExpandError, Location};
use crate::fence::{code_regions, region_at};
use crate::parser::{OPEN, parse_tag};
use crate::placeholder::link_targets;
use crate::registry::ShortcodeRegistry;

/// Result of expanding one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Markdown with every tag replaced by its fragment.
    pub output: String,
    /// Names of the shortcodes that were invoked.
    pub invoked: BTreeSet<String>,
    /// Shortnames referenced by deferred internal links.
    pub dependencies: Vec<String>,
}

/// Expands shortcode tags using a registry.
///
/// # Example
///
/// ```
/// use quire_shortcodes::{Expander, ShortcodeRegistry};
///
/// let registry = ShortcodeRegistry::with_builtins(1);
/// let expansion = Expander::new(&registry)
///     .expand(r#"Score: {{< rating 8 >}}"#)
///     .unwrap();
///
/// assert!(expansion.output.contains("review-stars"));
/// assert!(expansion.invoked.contains("rating"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    registry: &'a ShortcodeRegistry,
    source_path: Option<&'a Path>,
    line_offset: usize,
}

impl<'a> Expander<'a> {
    /// Create an expander over `registry`.
    #[must_use]
    pub fn new(registry: &'a ShortcodeRegistry) -> Self {
        Self {
            registry,
            source_path: None,
            line_offset: 0,
        }
    }

    /// Set the source file reported in error locations.
    #[must_use]
    pub fn with_source_path(mut self, path: &'a Path) -> Self {
        self.source_path = Some(path);
        self
    }

    /// Number of file lines preceding the body (e.g. frontmatter).
    ///
    /// Added to every reported line number so errors point into the file.
    #[must_use]
    pub fn with_line_offset(mut self, lines: usize) -> Self {
        self.line_offset = lines;
        self
    }

    /// Expand every shortcode in `body`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExpandError`] encountered; no partial output is
    /// produced.
    pub fn expand(&self, body: &str) -> Result<Expansion, ExpandError> {
        let mut invoked = BTreeSet::new();
        let output = self.expand_span(body, body, 0, &mut invoked)?;
        let dependencies = link_targets(&output);

        Ok(Expansion {
            output,
            invoked,
            dependencies,
        })
    }

    fn expand_span(
        &self,
        full: &str,
        text: &str,
        base: usize,
        invoked: &mut BTreeSet<String>,
    ) -> Result<String, ExpandError> {
        let regions = code_regions(text);
        let mut output = String::with_capacity(text.len());
        let mut pos = 0;

        while let Some(start) = next_tag(text, pos, &regions) {
            output.push_str(&text[pos..start]);
            let location = self.locate(full, base + start);

            let (tag, tag_len) = parse_tag(&text[start..]).map_err(|message| {
                ExpandError::Malformed {
                    message,
                    location: location.clone(),
                }
            })?;
            let tag_end = start + tag_len;

            if tag.closing {
                return Err(ExpandError::Unbalanced {
                    name: tag.name,
                    message: "closing tag without a matching opener".to_owned(),
                    location,
                });
            }

            let definition =
                self.registry
                    .lookup(&tag.name)
                    .map_err(|_| ExpandError::UnknownShortcode {
                        name: tag.name.clone(),
                        location: location.clone(),
                    })?;

            let closer = match definition.body_mode() {
                BodyMode::Forbidden => None,
                BodyMode::Optional => find_closer(text, tag_end, &tag.name, &regions),
                BodyMode::Required => Some(
                    find_closer(text, tag_end, &tag.name, &regions).ok_or_else(|| {
                        ExpandError::Unbalanced {
                            name: tag.name.clone(),
                            message: format!("missing closing tag `{{{{< /{} >}}}}`", tag.name),
                            location: location.clone(),
                        }
                    })?,
                ),
            };

            let (body, end) = match closer {
                Some(closer) => {
                    let inner = &text[tag_end..closer.start];
                    let expanded = self.expand_span(full, inner, base + tag_end, invoked)?;
                    (Some(expanded), closer.end)
                }
                None => (None, tag_end),
            };

            let name = tag.name.clone();
            let (positional, named) = tag.into_arguments();
            let args = definition
                .bind(positional, named, body)
                .map_err(|err| match err {
                    BindError::Count(message) => ExpandError::ArgumentCount {
                        name: name.clone(),
                        message,
                        location: location.clone(),
                    },
                    BindError::Unexpected(argument) => ExpandError::UnexpectedArgument {
                        name: name.clone(),
                        argument,
                        location: location.clone(),
                    },
                })?;

            let ctx = ShortcodeContext {
                line: location.line - self.line_offset,
                offset: base + start,
            };
            let fragment = definition
                .render(&args, &ctx)
                .map_err(|message| ExpandError::Render {
                    name: name.clone(),
                    message,
                    location,
                })?;

            let line_start = output.rfind('\n').map_or(0, |i| i + 1);
            let fragment = neutralize(&output[line_start..], &fragment);
            output.push_str(&fragment);
            invoked.insert(name);
            pos = end;
        }

        output.push_str(&text[pos..]);
        Ok(output)
    }

    fn locate(&self, full: &str, offset: usize) -> Location {
        let before = &full[..offset];
        let line = before.matches('\n').count() + 1 + self.line_offset;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |current| current.chars().count())
            + 1;
        Location {
            path: self.source_path.map(Path::to_path_buf),
            line,
            column,
        }
    }
}

/// Names of shortcodes a body invokes, without expanding anything.
///
/// Tolerant of malformed tags (they are skipped); used to fingerprint bodies
/// before expansion.
#[must_use]
pub fn scan_invocations(body: &str) -> BTreeSet<String> {
    let regions = code_regions(body);
    let mut names = BTreeSet::new();
    let mut pos = 0;

    while let Some(start) = next_tag(body, pos, &regions) {
        match parse_tag(&body[start..]) {
            Ok((tag, len)) => {
                if !tag.closing {
                    names.insert(tag.name);
                }
                pos = start + len;
            }
            Err(_) => pos = start + OPEN.len(),
        }
    }

    names
}

/// Byte offset of the next tag opener at or after `from`, outside code fences.
fn next_tag(text: &str, from: usize, regions: &[Range<usize>]) -> Option<usize> {
    let mut search = from;
    loop {
        let start = search + text.get(search..)?.find(OPEN)?;
        match region_at(regions, start) {
            Some(region) => search = region.end,
            None => return Some(start),
        }
    }
}

/// Locate the closer for a block opened just before `from`.
///
/// Stops at the first tag with the same name: a closer ends the block, an
/// opener means the block is not closed (same-name nesting is unsupported).
fn find_closer(
    text: &str,
    from: usize,
    name: &str,
    regions: &[Range<usize>],
) -> Option<Range<usize>> {
    let mut search = from;
    while let Some(start) = next_tag(text, search, regions) {
        match parse_tag(&text[start..]) {
            Ok((tag, len)) if tag.name == name => {
                return tag.closing.then_some(start..start + len);
            }
            Ok((_, len)) => search = start + len,
            Err(_) => search = start + OPEN.len(),
        }
    }
    None
}

/// Escape tag openers in a rendered fragment so output never re-expands.
///
/// `line_prefix` is the output already written on the line the fragment
/// lands on. Fences are detected on the spliced text, so a fence that no
/// longer starts a line does not protect its contents. Openers inside a
/// real fence are left alone; they are literal already.
fn neutralize(line_prefix: &str, fragment: &str) -> String {
    if !fragment.contains(OPEN) {
        return fragment.to_owned();
    }

    let spliced = format!("{line_prefix}{fragment}");
    let regions = code_regions(&spliced);
    let mut output = String::with_capacity(fragment.len());
    let mut pos = line_prefix.len();
    while let Some(start) = next_tag(&spliced, pos, &regions) {
        output.push_str(&spliced[pos..start]);
        output.push_str("{{&lt;");
        pos = start + OPEN.len();
    }
    output.push_str(&spliced[pos..]);
    output
}
