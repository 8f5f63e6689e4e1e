//! Shortcode registry.
//!
//! Maps shortcode names to their definitions. The registry is assembled once at
//! startup and shared read-only by every expansion afterwards.

use std::collections::HashMap;

use crate::builtins;
use crate::definition::ShortcodeDefinition;
use crate::error::ShortcodeError;

/// Name to definition mapping plus the global registry version.
#[derive(Debug)]
pub struct ShortcodeRegistry {
    definitions: HashMap<String, ShortcodeDefinition>,
    version: u32,
}

impl ShortcodeRegistry {
    /// Create an empty registry.
    ///
    /// `version` is folded into every content fingerprint; bumping it
    /// invalidates every cached render.
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            definitions: HashMap::new(),
            version,
        }
    }

    /// Create a registry pre-populated with the built-in shortcodes.
    #[must_use]
    pub fn with_builtins(version: u32) -> Self {
        let mut registry = Self::new(version);
        for (name, definition) in builtins::all() {
            registry.definitions.insert(name.to_owned(), definition);
        }
        registry
    }

    /// Register a shortcode under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::DuplicateShortcode`] if `name` is taken and
    /// [`ShortcodeError::InvalidName`] if it is not a valid tag name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: ShortcodeDefinition,
    ) -> Result<(), ShortcodeError> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ShortcodeError::InvalidName(name));
        }
        if self.definitions.contains_key(&name) {
            return Err(ShortcodeError::DuplicateShortcode(name));
        }
        tracing::debug!(shortcode = %name, version = definition.version(), "Registered shortcode");
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Look up a definition by name.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::UnknownShortcode`] if nothing is registered
    /// under `name`.
    pub fn lookup(&self, name: &str) -> Result<&ShortcodeDefinition, ShortcodeError> {
        self.definitions
            .get(name)
            .ok_or_else(|| ShortcodeError::UnknownShortcode(name.to_owned()))
    }

    /// Check whether a shortcode is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Global registry version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Versions of the named shortcodes, sorted by name.
    ///
    /// Unknown names are skipped: a body invoking them fails expansion anyway.
    #[must_use]
    pub fn signature<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<(String, u32)> {
        let mut signature: Vec<(String, u32)> = names
            .into_iter()
            .filter_map(|name| {
                self.definitions
                    .get(name)
                    .map(|def| (name.to_owned(), def.version()))
            })
            .collect();
        signature.sort();
        signature.dedup();
        signature
    }
}

/// Check if a name is a valid shortcode name.
///
/// Valid names contain only ASCII alphanumerics, hyphens, and underscores.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(ShortcodeRegistry: Send, Sync);

    fn noop() -> ShortcodeDefinition {
        ShortcodeDefinition::new(|_, _| Ok(String::new()))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ShortcodeRegistry::new(1);
        registry.register("kbd", noop().with_version(3)).unwrap();

        assert_eq!(registry.lookup("kbd").unwrap().version(), 3);
        assert!(registry.contains("kbd"));
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = ShortcodeRegistry::new(1);
        registry.register("kbd", noop()).unwrap();

        let err = registry.register("kbd", noop()).unwrap_err();
        assert_eq!(err, ShortcodeError::DuplicateShortcode("kbd".to_owned()));
    }

    #[test]
    fn test_register_duplicate_of_builtin() {
        let mut registry = ShortcodeRegistry::with_builtins(1);
        let err = registry.register("youtube", noop()).unwrap_err();
        assert_eq!(err, ShortcodeError::DuplicateShortcode("youtube".to_owned()));
    }

    #[test]
    fn test_register_invalid_name() {
        let mut registry = ShortcodeRegistry::new(1);
        let err = registry.register("has space", noop()).unwrap_err();
        assert_eq!(err, ShortcodeError::InvalidName("has space".to_owned()));
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ShortcodeRegistry::new(1);
        let err = registry.lookup("missing").unwrap_err();
        assert_eq!(err, ShortcodeError::UnknownShortcode("missing".to_owned()));
    }

    #[test]
    fn test_builtins_registered() {
        let registry = ShortcodeRegistry::with_builtins(7);
        assert_eq!(registry.version(), 7);
        assert_eq!(
            registry.names(),
            vec![
                "email",
                "img",
                "link",
                "rating",
                "related",
                "soundcloud",
                "spoiler",
                "youtube"
            ]
        );
    }

    #[test]
    fn test_signature_sorted_and_deduplicated() {
        let mut registry = ShortcodeRegistry::new(1);
        registry.register("b", noop().with_version(2)).unwrap();
        registry.register("a", noop()).unwrap();

        let signature = registry.signature(["b", "a", "b", "unknown"]);
        assert_eq!(
            signature,
            vec![("a".to_owned(), 1), ("b".to_owned(), 2)]
        );
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("my-code_2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("/close"));
        assert!(!is_valid_name("ünicode"));
    }
}
