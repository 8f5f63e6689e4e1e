//! Loaded content items.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::frontmatter::Frontmatter;

/// Title used when the frontmatter has none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Type-specific data derived while loading.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemDetails {
    #[default]
    None,
    /// A scored review.
    Review {
        rating: Option<f64>,
        max_rating: f64,
    },
    /// An external link with its display domain.
    Bookmark {
        link: Option<String>,
        domain: Option<String>,
    },
}

/// One content file, as loaded from disk.
///
/// `rendered_body` and `fingerprint` stay empty until the build pipeline has
/// processed the item.
#[derive(Debug, Clone)]
pub struct ContentItem {
    /// Registered type name.
    pub kind: String,
    /// File stem, or bundle directory name.
    pub slug: String,
    /// Frontmatter locale or the site language.
    pub locale: String,
    /// Source file.
    pub path: PathBuf,
    pub frontmatter: Frontmatter,
    /// Markdown and shortcode source.
    pub raw_body: String,
    /// File lines preceding the body.
    pub body_line: usize,
    pub title: String,
    /// Site-absolute URL path, e.g. `/posts/hello/`.
    pub url: String,
    /// Icon of the item's type.
    pub default_icon: String,
    pub details: ItemDetails,
    /// HTML after both passes.
    pub rendered_body: Option<String>,
    /// Render cache key.
    pub fingerprint: Option<String>,
}

impl ContentItem {
    /// Create an item with title, URL and details still to be derived.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        slug: impl Into<String>,
        locale: impl Into<String>,
        path: impl Into<PathBuf>,
        frontmatter: Frontmatter,
        raw_body: impl Into<String>,
    ) -> Self {
        let title = frontmatter
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_owned();
        Self {
            kind: kind.into(),
            slug: slug.into(),
            locale: locale.into(),
            path: path.into(),
            frontmatter,
            raw_body: raw_body.into(),
            body_line: 0,
            title,
            url: String::new(),
            default_icon: String::new(),
            details: ItemDetails::None,
            rendered_body: None,
            fingerprint: None,
        }
    }

    #[must_use]
    pub fn shortname(&self) -> Option<&str> {
        self.frontmatter.shortname.as_deref()
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.frontmatter.date
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.frontmatter.tags
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.frontmatter.draft
    }

    /// Frontmatter emoji when set, otherwise the type's icon.
    #[must_use]
    pub fn icon(&self) -> &str {
        self.frontmatter
            .emoji
            .as_deref()
            .filter(|emoji| !emoji.trim().is_empty())
            .unwrap_or(&self.default_icon)
    }

    /// Five-star rendering of a review score; `None` for other items.
    #[must_use]
    pub fn stars(&self) -> Option<String> {
        match self.details {
            ItemDetails::Review {
                rating: Some(rating),
                max_rating,
            } => Some(star_string(rating, max_rating)),
            _ => None,
        }
    }

    /// Whether the rendered body holds exactly one `<iframe>` player.
    ///
    /// Always `false` before the body is rendered.
    #[must_use]
    pub fn has_single_embed(&self) -> bool {
        self.rendered_body
            .as_deref()
            .is_some_and(|html| html.matches("<iframe").count() == 1)
    }
}

/// Render `rating` out of `max` as five stars: full, at most one half, empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn star_string(rating: f64, max: f64) -> String {
    let score = (rating / max * 5.0).clamp(0.0, 5.0);
    let full = score.floor();
    let half = score - full >= 0.5;
    let full = full as usize;
    let empty = 5 - full - usize::from(half);

    let mut stars = "★".repeat(full);
    if half {
        stars.push('⯨');
    }
    stars.push_str(&"☆".repeat(empty));
    stars
}
