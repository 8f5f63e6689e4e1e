//! Per-type behavior.
//!
//! Every registered content type is a [`ContentKind`]: a descriptor (name,
//! icon, URL segments, archetype) plus hooks for type-specific fields, URL
//! construction and ordering. Built-in kinds are [`Post`], [`Micro`],
//! [`Review`], [`Bookmark`], [`Music`] and [`Page`]; `[types.*]` tables in
//! `quire.toml` become [`GenericType`]s.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

use quire_config::TypeConfig;

use crate::item::{ContentItem, ItemDetails};

/// Scale used when a review sets no `max_rating`.
pub const DEFAULT_MAX_RATING: f64 = 10.0;

/// Registry entry describing one content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    /// Icon for items without an `emoji`.
    pub icon: String,
    /// URL segment before the slug; `None` places items at the site root.
    pub url_slug: Option<String>,
    /// Per-locale overrides of `url_slug`.
    pub localized_slugs: BTreeMap<String, String>,
    /// Template for new items of this type.
    pub archetype: Option<PathBuf>,
}

impl TypeDescriptor {
    /// Create a descriptor whose URL segment equals its name.
    #[must_use]
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            url_slug: Some(name.clone()),
            name,
            icon: icon.into(),
            localized_slugs: BTreeMap::new(),
            archetype: None,
        }
    }

    #[must_use]
    pub fn with_url_slug(mut self, url_slug: Option<&str>) -> Self {
        self.url_slug = url_slug.map(str::to_owned);
        self
    }

    #[must_use]
    pub fn with_localized_slug(mut self, locale: &str, slug: &str) -> Self {
        self.localized_slugs
            .insert(locale.to_owned(), slug.to_owned());
        self
    }

    #[must_use]
    pub fn with_archetype(mut self, archetype: Option<PathBuf>) -> Self {
        self.archetype = archetype;
        self
    }

    /// URL segment for `locale`, falling back to the default segment.
    #[must_use]
    pub fn url_segment(&self, locale: &str) -> Option<&str> {
        self.localized_slugs
            .get(locale)
            .or(self.url_slug.as_ref())
            .map(String::as_str)
            .filter(|segment| !segment.is_empty())
    }

    /// URL path of an item: `/{segment}/{slug}/`, or `/{slug}/` at the root.
    #[must_use]
    pub fn url_for(&self, slug: &str, locale: &str) -> String {
        match self.url_segment(locale) {
            Some(segment) => format!("/{segment}/{slug}/"),
            None => format!("/{slug}/"),
        }
    }
}

/// Behavior of one content type, dispatched by name through the
/// [`TypeRegistry`](crate::TypeRegistry).
pub trait ContentKind: Send + Sync {
    fn descriptor(&self) -> &TypeDescriptor;

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor;

    /// Derive type-specific fields after frontmatter parsing.
    ///
    /// # Errors
    ///
    /// Returns a message when a field value is invalid for this type.
    fn prepare(&self, _item: &mut ContentItem) -> Result<(), String> {
        Ok(())
    }

    /// URL path of `item`.
    fn url(&self, item: &ContentItem) -> String {
        self.descriptor().url_for(&item.slug, &item.locale)
    }

    /// Listing order; newest first unless overridden.
    fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering {
        by_date_desc(a, b)
    }
}

/// Newest first, undated items last, then by slug.
#[must_use]
pub fn by_date_desc(a: &ContentItem, b: &ContentItem) -> Ordering {
    match (a.date(), b.date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug.cmp(&b.slug))
}

/// Long-form blog post.
pub struct Post {
    descriptor: TypeDescriptor,
}

impl Default for Post {
    fn default() -> Self {
        Self {
            descriptor: TypeDescriptor::new("post", "📝").with_url_slug(Some("posts")),
        }
    }
}

impl ContentKind for Post {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }
}

/// Short status update.
pub struct Micro {
    descriptor: TypeDescriptor,
}

impl Default for Micro {
    fn default() -> Self {
        Self {
            descriptor: TypeDescriptor::new("micro", "💬"),
        }
    }
}

impl ContentKind for Micro {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }
}

/// Scored review (`rating` out of `max_rating`).
pub struct Review {
    descriptor: TypeDescriptor,
}

impl Default for Review {
    fn default() -> Self {
        Self {
            descriptor: TypeDescriptor::new("review", "⭐").with_url_slug(Some("reviews")),
        }
    }
}

impl ContentKind for Review {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }

    fn prepare(&self, item: &mut ContentItem) -> Result<(), String> {
        let max_rating = item.frontmatter.max_rating.unwrap_or(DEFAULT_MAX_RATING);
        if !max_rating.is_finite() || max_rating <= 0.0 {
            return Err(format!("max_rating must be positive, got {max_rating}"));
        }
        let rating = item.frontmatter.rating;
        if let Some(rating) = rating
            && !(0.0..=max_rating).contains(&rating)
        {
            return Err(format!("rating {rating} is outside 0..={max_rating}"));
        }
        item.details = ItemDetails::Review { rating, max_rating };
        Ok(())
    }
}

/// Link to an external page.
pub struct Bookmark {
    descriptor: TypeDescriptor,
}

impl Default for Bookmark {
    fn default() -> Self {
        Self {
            descriptor: TypeDescriptor::new("bookmark", "🔖").with_url_slug(Some("bookmarks")),
        }
    }
}

impl ContentKind for Bookmark {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }

    fn prepare(&self, item: &mut ContentItem) -> Result<(), String> {
        item.details = link_details(item);
        Ok(())
    }
}

/// Bookmark of a track or album, usually carrying one player embed.
///
/// See [`ContentItem::has_single_embed`].
pub struct Music {
    descriptor: TypeDescriptor,
}

impl Default for Music {
    fn default() -> Self {
        Self {
            descriptor: TypeDescriptor::new("music", "🎵"),
        }
    }
}

impl ContentKind for Music {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }

    fn prepare(&self, item: &mut ContentItem) -> Result<(), String> {
        item.details = link_details(item);
        Ok(())
    }
}

fn link_details(item: &ContentItem) -> ItemDetails {
    let link = item
        .frontmatter
        .link
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_owned);
    let domain = link.as_deref().and_then(link_domain);
    ItemDetails::Bookmark { link, domain }
}

/// Host part of an absolute URL, lowercased and without `www.`.
fn link_domain(link: &str) -> Option<String> {
    let (_, rest) = link.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = host.split(':').next().unwrap_or(host).to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    (!host.is_empty()).then(|| host.to_owned())
}

/// Standalone page at the site root, listed by title.
pub struct Page {
    descriptor: TypeDescriptor,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            descriptor: TypeDescriptor::new("page", "📄").with_url_slug(None),
        }
    }
}

impl ContentKind for Page {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }

    fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.slug.cmp(&b.slug))
    }
}

/// Type declared in `quire.toml` with default behavior.
pub struct GenericType {
    descriptor: TypeDescriptor,
}

impl GenericType {
    #[must_use]
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self { descriptor }
    }

    /// Build from a `[types.<name>]` table.
    #[must_use]
    pub fn from_config(name: &str, config: &TypeConfig) -> Self {
        let url_slug = config.url_slug.as_deref().unwrap_or(name);
        Self::new(
            TypeDescriptor::new(name, config.icon.clone())
                .with_url_slug(Some(url_slug))
                .with_archetype(config.archetype.clone()),
        )
    }
}

impl ContentKind for GenericType {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut TypeDescriptor {
        &mut self.descriptor
    }
}
