//! Configuration management for quire.
//!
//! Reads `quire.toml`, found in the working directory or the nearest parent
//! that has one. Command-line flags are layered on top via [`CliSettings`].
//!
//! Relative paths (`content.source_dir`, `cache.dir`, `types.*.archetype`)
//! are resolved against the directory containing the config file, or the
//! current working directory when no file was found.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Type names provided by the content crate itself.
///
/// `[types.*]` tables may not reuse these.
pub const BUILTIN_TYPE_NAMES: &[&str] =
    &["post", "micro", "review", "bookmark", "music", "page"];

/// File looked up by discovery.
const CONFIG_FILENAME: &str = "quire.toml";

/// Command-line overrides; `None` keeps the file's value.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Content root.
    pub source_dir: Option<PathBuf>,
    /// Publish drafts.
    pub include_drafts: Option<bool>,
    /// Force every item to miss the render cache.
    pub full_rebuild: Option<bool>,
    /// `Some(false)` disables the render cache.
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Build behavior.
    pub build: BuildConfig,
    /// Render cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Shortcode settings.
    pub shortcodes: ShortcodesConfig,
    /// Localized URL segments: locale -> type name -> segment.
    pub slugs: BTreeMap<String, BTreeMap<String, String>>,
    /// User-declared content types.
    pub types: BTreeMap<String, TypeConfig>,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// File this configuration came from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site-wide settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Absolute site URL, empty for root-relative output.
    pub base_url: String,
    /// Default locale for items without a `locale` field.
    pub language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "quire site".to_owned(),
            base_url: String::new(),
            language: "en".to_owned(),
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
    include_drafts: Option<bool>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Root of the content tree.
    pub source_dir: PathBuf,
    /// Whether draft items are published.
    pub include_drafts: bool,
}

/// What to do with an item whose body fails to expand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Fail the whole build on the first content error.
    #[default]
    Abort,
    /// Drop the offending item, record it on the report and continue.
    Skip,
}

/// Build behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Content-local error policy.
    pub error_policy: ErrorPolicy,
    /// Default number of related items.
    pub related_limit: usize,
    /// Emit internal link hrefs relative to the linking item.
    pub relative_links: bool,
    /// Bypass render cache lookups (CLI only).
    #[serde(skip)]
    pub full_rebuild: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Abort,
            related_limit: 3,
            relative_links: false,
            full_rebuild: false,
        }
    }
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Whether the render cache is persisted between builds.
    pub enabled: bool,
    /// Directory holding the cache store.
    pub dir: PathBuf,
}

/// Shortcode settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShortcodesConfig {
    /// Global registry version, folded into every fingerprint.
    ///
    /// Bump to invalidate every cached render at once.
    pub version: u32,
}

impl Default for ShortcodesConfig {
    fn default() -> Self {
        Self { version: 1 }
    }
}

/// A user-declared content type (`[types.<name>]`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TypeConfig {
    /// Default icon for items of this type.
    pub icon: String,
    /// URL segment; defaults to the type name.
    pub url_slug: Option<String>,
    /// Template used by `new`-style tooling.
    pub archetype: Option<PathBuf>,
}

impl Default for TypeConfig {
    fn default() -> Self {
        Self {
            icon: "📄".to_owned(),
            url_slug: None,
            archetype: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load `config_path`, or the discovered `quire.toml`, or defaults rooted
    /// at the working directory, then apply `cli_settings` on top.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Defaults, with relative paths resolved against `base`.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            content: ContentConfigRaw::default(),
            build: BuildConfig::default(),
            cache: CacheConfigRaw::default(),
            shortcodes: ShortcodesConfig::default(),
            slugs: BTreeMap::new(),
            types: BTreeMap::new(),
            content_resolved: ContentConfig::default(),
            cache_resolved: CacheConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(include_drafts) = settings.include_drafts {
            self.content_resolved.include_drafts = include_drafts;
        }
        if let Some(full_rebuild) = settings.full_rebuild {
            self.build.full_rebuild = full_rebuild;
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
    }

    /// Nearest `quire.toml` walking up from the working directory.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Check value ranges and `[types]` names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.related_limit == 0 {
            return Err(ConfigError::Validation(
                "build.related_limit must be at least 1".to_owned(),
            ));
        }

        let base_url = &self.site.base_url;
        if !base_url.is_empty()
            && !base_url.starts_with("http://")
            && !base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".to_owned(),
            ));
        }

        for name in self.types.keys() {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "type names cannot be empty".to_owned(),
                ));
            }
            if BUILTIN_TYPE_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "types.{name} collides with a built-in content type"
                )));
            }
        }

        Ok(())
    }

    /// Localized URL segment for `type_name` in `locale`, if configured.
    #[must_use]
    pub fn localized_slug(&self, locale: &str, type_name: &str) -> Option<&str> {
        self.slugs
            .get(locale)
            .and_then(|table| table.get(type_name))
            .map(String::as_str)
    }

    /// Fill the `*_resolved` sections from the raw ones.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            source_dir: resolve(self.content.source_dir.as_deref(), "content"),
            include_drafts: self.content.include_drafts.unwrap_or(false),
        };
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            dir: resolve(self.cache.dir.as_deref(), ".quire/cache"),
        };
        for type_config in self.types.values_mut() {
            if let Some(archetype) = &type_config.archetype {
                type_config.archetype = Some(config_dir.join(archetype));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.site.language, "en");
        assert_eq!(config.site.base_url, "");
        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/test/content")
        );
        assert!(!config.content_resolved.include_drafts);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/test/.quire/cache"));
        assert!(config.cache_resolved.enabled);
        assert_eq!(config.build.error_policy, ErrorPolicy::Abort);
        assert_eq!(config.build.related_limit, 3);
        assert!(!config.build.relative_links);
        assert!(!config.build.full_rebuild);
        assert_eq!(config.shortcodes.version, 1);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml_str("", Path::new("/site")).unwrap();
        assert_eq!(config.build.related_limit, 3);
        assert!(config.types.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[site]
title = "Notebook"
base_url = "https://example.com"
language = "de"

[content]
source_dir = "posts-src"
include_drafts = true

[build]
error_policy = "skip"
related_limit = 5
relative_links = true

[cache]
enabled = false
dir = "tmp/cache"

[shortcodes]
version = 4

[slugs.de]
post = "beitraege"

[types.notes]
icon = "🗒"
url_slug = "notizen"
archetype = "archetypes/notes.md"
"#;
        let config = Config::from_toml_str(toml, Path::new("/site")).unwrap();

        assert_eq!(config.site.title, "Notebook");
        assert_eq!(config.site.language, "de");
        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/site/posts-src")
        );
        assert!(config.content_resolved.include_drafts);
        assert_eq!(config.build.error_policy, ErrorPolicy::Skip);
        assert_eq!(config.build.related_limit, 5);
        assert!(config.build.relative_links);
        assert!(!config.cache_resolved.enabled);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/site/tmp/cache"));
        assert_eq!(config.shortcodes.version, 4);
        assert_eq!(config.localized_slug("de", "post"), Some("beitraege"));
        assert_eq!(config.localized_slug("en", "post"), None);

        let notes = &config.types["notes"];
        assert_eq!(notes.icon, "🗒");
        assert_eq!(notes.url_slug.as_deref(), Some("notizen"));
        assert_eq!(
            notes.archetype,
            Some(PathBuf::from("/site/archetypes/notes.md"))
        );
    }

    #[test]
    fn test_type_config_defaults() {
        let config = Config::from_toml_str("[types.links]\n", Path::new("/site")).unwrap();
        assert_eq!(config.types["links"], TypeConfig::default());
    }

    #[test]
    fn test_unknown_error_policy_is_parse_error() {
        let result = Config::from_toml_str("[build]\nerror_policy = \"ignore\"\n", Path::new("/"));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_related_limit_zero() {
        let result = Config::from_toml_str("[build]\nrelated_limit = 0\n", Path::new("/"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("related_limit"));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let result = Config::from_toml_str("[site]\nbase_url = \"example.com\"\n", Path::new("/"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));

        let ok = Config::from_toml_str("[site]\nbase_url = \"http://x.org\"\n", Path::new("/"));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_validate_type_collides_with_builtin() {
        let result = Config::from_toml_str("[types.review]\n", Path::new("/"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("types.review"));
    }

    #[test]
    fn test_validate_empty_type_name() {
        let result = Config::from_toml_str("[types.\" \"]\n", Path::new("/"));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere")),
            include_drafts: Some(true),
            full_rebuild: Some(true),
            cache_enabled: Some(false),
        });

        assert_eq!(config.content_resolved.source_dir, PathBuf::from("/elsewhere"));
        assert!(config.content_resolved.include_drafts);
        assert!(config.build.full_rebuild);
        assert!(!config.cache_resolved.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.content_resolved.source_dir, PathBuf::from("/site/content"));
        assert!(config.cache_resolved.enabled);
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let result = Config::load(Some(Path::new("/nonexistent/quire.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_explicit_path_resolves_relative_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[content]\nsource_dir = \"src\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.content_resolved.source_dir, tmp.path().join("src"));
        assert_eq!(config.config_path, Some(path));
    }
}
