//! Build pipeline.
//!
//! 1. Load every item (structural errors abort).
//! 2. Drop drafts unless the build includes them.
//! 3. Pass 1, in parallel: cached shortcode expansion and Markdown rendering.
//! 4. Build the [`SiteIndex`] over the surviving items.
//! 5. Pass 2, in parallel: placeholder substitution against the index.
//! 6. Persist the render cache.

use std::collections::BTreeMap;

use quire_cache::{CacheStore, FileStore, NullStore};
use quire_config::{Config, ErrorPolicy};
use quire_content::{ContentItem, Loader, TypeRegistry};
use quire_shortcodes::ShortcodeRegistry;
use rayon::prelude::*;

use crate::error::{BuildError, SkippedItem, Warning};
use crate::index::SiteIndex;
use crate::render_cache::{ItemRenderer, RenderCache};
use crate::resolver::Resolver;

/// Render cache format version; a mismatch wipes the store.
const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Summary of a finished build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Published items per type name.
    pub counts: BTreeMap<String, usize>,
    /// Drafts left out of this build.
    pub drafts_excluded: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Items dropped under the skip policy.
    pub skipped: Vec<SkippedItem>,
    pub warnings: Vec<Warning>,
}

impl BuildReport {
    /// Total published items.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Everything a build hands to the template stage.
#[derive(Debug)]
pub struct BuildOutput {
    /// Published items, by source path, with `rendered_body` resolved.
    pub items: Vec<ContentItem>,
    /// Index over `items`; entry ids are positions in `items`.
    pub index: SiteIndex,
    pub report: BuildReport,
}

/// One build over a configured content tree.
pub struct Pipeline<'a> {
    config: &'a Config,
    types: TypeRegistry,
    shortcodes: ShortcodeRegistry,
    store: Option<Box<dyn CacheStore>>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline with built-in shortcodes and the configured types.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Registry`] if a configured type collides with a
    /// registered one.
    pub fn new(config: &'a Config) -> Result<Self, BuildError> {
        Ok(Self {
            config,
            types: TypeRegistry::from_config(config)?,
            shortcodes: ShortcodeRegistry::with_builtins(config.shortcodes.version),
            store: None,
        })
    }

    /// Replace the shortcode registry, e.g. to add site-specific shortcodes.
    #[must_use]
    pub fn with_shortcodes(mut self, shortcodes: ShortcodeRegistry) -> Self {
        self.shortcodes = shortcodes;
        self
    }

    /// Use `store` instead of the configured cache directory.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Run the build.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Load`] for structural content errors, and
    /// [`BuildError::Expand`] for an unknown shortcode or, under
    /// [`ErrorPolicy::Abort`], the first failing item. The cache store is
    /// left untouched on error.
    pub fn build(mut self) -> Result<BuildOutput, BuildError> {
        let config = self.config;
        let source_dir = &config.content_resolved.source_dir;

        tracing::info!(path = %source_dir.display(), "Loading content");
        let loaded =
            Loader::new(&self.types, config.site.language.as_str()).load_all(source_dir)?;

        let include_drafts = config.content_resolved.include_drafts;
        let total_loaded = loaded.len();
        let items: Vec<ContentItem> = loaded
            .into_iter()
            .filter(|item| include_drafts || !item.is_draft())
            .collect();
        let drafts_excluded = total_loaded - items.len();

        let store = self.store.take().unwrap_or_else(|| default_store(config));
        let cache = RenderCache::new(store, config.build.full_rebuild);
        let renderer = ItemRenderer::new(&self.shortcodes);

        tracing::info!(items = items.len(), "Rendering content");
        let results: Vec<_> = items
            .par_iter()
            .map(|item| cache.get_or_render(item, &renderer))
            .collect();

        let mut published = Vec::with_capacity(items.len());
        let mut dependencies = Vec::with_capacity(items.len());
        let mut skipped = Vec::new();
        for (mut item, result) in items.into_iter().zip(results) {
            match result {
                Ok(rendered) => {
                    item.fingerprint = Some(rendered.fingerprint);
                    item.rendered_body = Some(rendered.entry.rendered_body);
                    dependencies.push(rendered.entry.dependencies);
                    published.push(item);
                }
                Err(error)
                    if error.is_structural()
                        || config.build.error_policy == ErrorPolicy::Abort =>
                {
                    return Err(error.into());
                }
                Err(error) => {
                    tracing::warn!(error = %error, "Skipping item");
                    skipped.push(SkippedItem {
                        path: item.path,
                        reason: error.to_string(),
                    });
                }
            }
        }

        let index = SiteIndex::build(&published, &self.types);
        let resolver = Resolver::new(&index, config.build.related_limit)
            .with_relative_links(config.build.relative_links);

        tracing::info!(items = published.len(), "Resolving cross-references");
        let warnings: Vec<Warning> = published
            .par_iter_mut()
            .zip(dependencies.par_iter())
            .enumerate()
            .map(|(id, (item, dependencies))| {
                let first_pass = item.rendered_body.take().unwrap_or_default();
                let resolved = resolver.resolve(id, &item.path, &first_pass, dependencies);
                item.rendered_body = Some(resolved.html);
                resolved.warnings
            })
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        cache.persist();

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for item in &published {
            *counts.entry(item.kind.clone()).or_default() += 1;
        }
        let report = BuildReport {
            counts,
            drafts_excluded,
            cache_hits: cache.hits(),
            cache_misses: cache.misses(),
            skipped,
            warnings,
        };

        tracing::info!(
            items = report.total(),
            hits = report.cache_hits,
            misses = report.cache_misses,
            warnings = report.warnings.len(),
            "Build complete"
        );

        Ok(BuildOutput {
            items: published,
            index,
            report,
        })
    }
}

/// File store under the configured cache directory, or nothing when caching
/// is disabled.
fn default_store(config: &Config) -> Box<dyn CacheStore> {
    if config.cache_resolved.enabled {
        Box::new(FileStore::new(
            config.cache_resolved.dir.clone(),
            CACHE_VERSION,
        ))
    } else {
        Box::new(NullStore)
    }
}
