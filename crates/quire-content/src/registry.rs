//! Registry of content types.

use std::collections::HashMap;

use quire_config::Config;

use crate::error::RegistryError;
use crate::kinds::{Bookmark, ContentKind, GenericType, Micro, Music, Page, Post, Review};

/// Maps type names to their [`ContentKind`].
///
/// Immutable once the build starts; shared across worker threads.
#[derive(Default)]
pub struct TypeRegistry {
    kinds: HashMap<String, Box<dyn ContentKind>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in kinds.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [Box<dyn ContentKind>; 6] = [
            Box::new(Post::default()),
            Box::new(Micro::default()),
            Box::new(Review::default()),
            Box::new(Bookmark::default()),
            Box::new(Music::default()),
            Box::new(Page::default()),
        ];
        for kind in builtins {
            let name = kind.descriptor().name.clone();
            registry.kinds.insert(name, kind);
        }
        registry
    }

    /// Built-in kinds plus `[types.*]` tables, with `[slugs.<locale>]`
    /// applied to every kind.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if a declared type reuses a
    /// registered name.
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let mut registry = Self::with_builtins();
        for (name, type_config) in &config.types {
            registry.register(Box::new(GenericType::from_config(name, type_config)))?;
        }

        for (locale, slugs) in &config.slugs {
            for (type_name, slug) in slugs {
                match registry.kinds.get_mut(type_name) {
                    Some(kind) => {
                        kind.descriptor_mut()
                            .localized_slugs
                            .insert(locale.clone(), slug.clone());
                    }
                    None => tracing::warn!(
                        locale = %locale,
                        type_name = %type_name,
                        "Localized slug for unknown content type ignored"
                    ),
                }
            }
        }

        Ok(registry)
    }

    /// Register `kind` under its descriptor name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateType`] if the name is taken.
    pub fn register(&mut self, kind: Box<dyn ContentKind>) -> Result<(), RegistryError> {
        let name = kind.descriptor().name.clone();
        if self.kinds.contains_key(&name) {
            return Err(RegistryError::DuplicateType(name));
        }
        tracing::debug!(type_name = %name, "Registered content type");
        self.kinds.insert(name, kind);
        Ok(())
    }

    /// Look up the kind registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownType`] if absent.
    pub fn get(&self, name: &str) -> Result<&dyn ContentKind, RegistryError> {
        self.kinds
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| RegistryError::UnknownType(name.to_owned()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
