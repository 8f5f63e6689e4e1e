//! First-pass rendering with caching.
//!
//! [`ItemRenderer`] expands an item's shortcodes and renders the Markdown to
//! HTML that may still contain placeholders. [`RenderCache`] memoizes that
//! output by content fingerprint across builds.
//!
//! The cache is loaded from its store once, when created, and written back
//! once by [`RenderCache::persist`]. Within a build each fingerprint is
//! written at most once; concurrent renders of identical content race
//! harmlessly and the first insert wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use quire_cache::{CacheStore, CacheStoreExt};
use quire_content::ContentItem;
use quire_shortcodes::{ExpandError, Expander, ShortcodeRegistry};
use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint;
use crate::markdown::render_markdown;

/// Store blob holding every entry.
const RENDERS_BLOB: &str = "renders";

/// Cached first-pass output of one item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// HTML with unresolved placeholders.
    pub rendered_body: String,
    /// Shortnames referenced by internal links.
    pub dependencies: Vec<String>,
}

/// Outcome of [`RenderCache::get_or_render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub fingerprint: String,
    pub entry: CacheEntry,
    /// Whether the expander was skipped.
    pub from_cache: bool,
}

/// Renders item bodies: shortcode expansion, then Markdown.
#[derive(Clone, Copy)]
pub struct ItemRenderer<'a> {
    registry: &'a ShortcodeRegistry,
}

impl<'a> ItemRenderer<'a> {
    #[must_use]
    pub fn new(registry: &'a ShortcodeRegistry) -> Self {
        Self { registry }
    }

    /// Cache key of `item` under this renderer's registry.
    #[must_use]
    pub fn fingerprint(&self, item: &ContentItem) -> String {
        fingerprint(item, self.registry)
    }

    /// Render `item` without consulting any cache.
    ///
    /// # Errors
    ///
    /// Returns the [`ExpandError`] of the first failing tag, located in the
    /// item's source file.
    pub fn render(&self, item: &ContentItem) -> Result<CacheEntry, ExpandError> {
        let expansion = Expander::new(self.registry)
            .with_source_path(&item.path)
            .with_line_offset(item.body_line)
            .expand(&item.raw_body)?;
        Ok(CacheEntry {
            rendered_body: render_markdown(&expansion.output),
            dependencies: expansion.dependencies,
        })
    }
}

/// Fingerprint-keyed cache of first-pass renders.
pub struct RenderCache {
    store: Box<dyn CacheStore>,
    /// Entries loaded from the store.
    previous: HashMap<String, CacheEntry>,
    /// Entries used by the current build.
    current: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl RenderCache {
    /// Load the cache from `store`.
    ///
    /// With `full_rebuild` the stored entries are ignored, so every item
    /// misses; [`persist`](Self::persist) then overwrites the store.
    #[must_use]
    pub fn new(store: Box<dyn CacheStore>, full_rebuild: bool) -> Self {
        let previous = if full_rebuild {
            tracing::info!("Full rebuild: ignoring cached renders");
            HashMap::new()
        } else {
            store.read_json(RENDERS_BLOB).unwrap_or_default()
        };
        tracing::debug!(entries = previous.len(), "Loaded render cache");

        Self {
            store,
            previous,
            current: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Return the cached render of `item`, rendering it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates [`ExpandError`] from a miss; nothing is cached then.
    pub fn get_or_render(
        &self,
        item: &ContentItem,
        renderer: &ItemRenderer<'_>,
    ) -> Result<Rendered, ExpandError> {
        let fingerprint = renderer.fingerprint(item);

        if let Some(entry) = self.lookup(&fingerprint) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(path = %item.path.display(), "Render cache hit");
            return Ok(Rendered {
                fingerprint,
                entry,
                from_cache: true,
            });
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %item.path.display(), "Render cache miss");
        let rendered = renderer.render(item)?;
        let entry = self
            .current()
            .entry(fingerprint.clone())
            .or_insert(rendered)
            .clone();

        Ok(Rendered {
            fingerprint,
            entry,
            from_cache: false,
        })
    }

    /// Write the entries used by this build back to the store.
    ///
    /// Entries not used by this build are dropped.
    pub fn persist(&self) {
        let current = self.current();
        self.store.write_json(RENDERS_BLOB, &*current);
        tracing::debug!(entries = current.len(), "Persisted render cache");
    }

    /// Number of lookups served from cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that rendered.
    #[must_use]
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    fn lookup(&self, fingerprint: &str) -> Option<CacheEntry> {
        let mut current = self.current();
        if let Some(entry) = current.get(fingerprint) {
            return Some(entry.clone());
        }
        let entry = self.previous.get(fingerprint)?.clone();
        current.insert(fingerprint.to_owned(), entry.clone());
        Some(entry)
    }

    fn current(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
