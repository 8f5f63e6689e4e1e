//! Content discovery and loading.
//!
//! Layout of the content tree:
//!
//! ```text
//! content/
//! ├── post/
//! │   ├── hello.md           slug "hello"
//! │   └── trip/
//! │       ├── post.md        slug "trip" (bundle)
//! │       └── photo.jpg
//! └── review/
//!     └── dune.md
//! ```
//!
//! The top-level directory names the type. Hidden entries are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::frontmatter::parse_document;
use crate::item::ContentItem;
use crate::kinds::ContentKind;
use crate::registry::TypeRegistry;

/// Content file names of a bundle directory, by priority.
const BUNDLE_FILES: &[&str] = &["post.md", "index.md"];

/// A discovered content file, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub type_name: String,
    pub slug: String,
    pub path: PathBuf,
}

/// Walk `root` and return every content file, sorted by path.
///
/// Returns an empty Vec if `root` doesn't exist.
#[must_use]
pub fn scan(root: &Path) -> Vec<SourceRef> {
    let mut refs = Vec::new();
    for (type_name, type_dir) in visible_entries(root).filter(|(_, path)| path.is_dir()) {
        for (name, path) in visible_entries(&type_dir) {
            if path.is_dir() {
                if let Some(bundle) = BUNDLE_FILES
                    .iter()
                    .map(|file| path.join(file))
                    .find(|file| file.is_file())
                {
                    refs.push(SourceRef {
                        type_name: type_name.clone(),
                        slug: name,
                        path: bundle,
                    });
                }
            } else if let Some(slug) = name.strip_suffix(".md") {
                refs.push(SourceRef {
                    type_name: type_name.clone(),
                    slug: slug.to_owned(),
                    path,
                });
            }
        }
    }
    refs.sort_by(|a, b| a.path.cmp(&b.path));
    refs
}

/// Non-hidden directory entries as `(name, path)`.
fn visible_entries(dir: &Path) -> impl Iterator<Item = (String, PathBuf)> {
    fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .filter(|(name, _)| !name.starts_with('.'))
}

/// Slug of a content file: the file stem, or the bundle directory name.
fn slug_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if BUNDLE_FILES.contains(&file_name.as_str())
        && let Some(dir) = path.parent().and_then(Path::file_name)
    {
        return dir.to_string_lossy().into_owned();
    }
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Loads content files into [`ContentItem`]s.
pub struct Loader<'a> {
    types: &'a TypeRegistry,
    default_locale: String,
}

impl<'a> Loader<'a> {
    /// Create a loader resolving types against `types`.
    ///
    /// Items without a `locale` field get `default_locale`.
    #[must_use]
    pub fn new(types: &'a TypeRegistry, default_locale: impl Into<String>) -> Self {
        Self {
            types,
            default_locale: default_locale.into(),
        }
    }

    /// Read and parse one file as an item of `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownType`] for unregistered types,
    /// [`LoadError::Io`] when the file can't be read, and the errors of
    /// [`Loader::load_source`].
    pub fn load_item(&self, path: &Path, type_name: &str) -> Result<ContentItem, LoadError> {
        self.check_type(path, type_name)?;
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_source(path, type_name, &slug_from_path(path), &source)
    }

    /// Parse `source` as the content of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedFrontmatter`] if the header block is
    /// missing or invalid, [`LoadError::UnknownType`] for unregistered types,
    /// and [`LoadError::InvalidItem`] when the type rejects a field.
    pub fn load_source(
        &self,
        path: &Path,
        type_name: &str,
        slug: &str,
        source: &str,
    ) -> Result<ContentItem, LoadError> {
        let kind = self.check_type(path, type_name)?;
        let document =
            parse_document(source).map_err(|e| LoadError::MalformedFrontmatter {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let locale = document
            .frontmatter
            .locale
            .clone()
            .filter(|locale| !locale.is_empty())
            .unwrap_or_else(|| self.default_locale.clone());

        let mut item = ContentItem::new(
            type_name,
            slug,
            locale,
            path,
            document.frontmatter,
            document.body,
        );
        item.body_line = document.body_line;
        item.default_icon.clone_from(&kind.descriptor().icon);
        item.url = kind.url(&item);
        kind.prepare(&mut item)
            .map_err(|message| LoadError::InvalidItem {
                path: path.to_path_buf(),
                message,
            })?;

        Ok(item)
    }

    /// Load every item under `root`.
    ///
    /// Items are returned sorted by path. Drafts are included.
    ///
    /// # Errors
    ///
    /// Fails on the first item that fails to load, and with
    /// [`LoadError::DuplicateShortname`] / [`LoadError::DuplicateSlug`] when
    /// uniqueness is violated.
    pub fn load_all(&self, root: &Path) -> Result<Vec<ContentItem>, LoadError> {
        if !root.is_dir() {
            tracing::warn!(path = %root.display(), "Content directory not found");
            return Ok(Vec::new());
        }

        let items = scan(root)
            .into_iter()
            .map(|source| self.load_item(&source.path, &source.type_name))
            .collect::<Result<Vec<_>, LoadError>>()?;

        check_unique(&items)?;
        tracing::info!(count = items.len(), path = %root.display(), "Loaded content");
        Ok(items)
    }

    fn check_type(
        &self,
        path: &Path,
        type_name: &str,
    ) -> Result<&'a dyn ContentKind, LoadError> {
        self.types
            .get(type_name)
            .map_err(|_| LoadError::UnknownType {
                path: path.to_path_buf(),
                type_name: type_name.to_owned(),
            })
    }
}

/// Shortnames are unique site-wide; slugs per (type, locale).
fn check_unique(items: &[ContentItem]) -> Result<(), LoadError> {
    let mut shortnames: HashMap<&str, &Path> = HashMap::new();
    let mut slugs: HashMap<(&str, &str, &str), &Path> = HashMap::new();

    for item in items {
        if let Some(shortname) = item.shortname()
            && let Some(first) = shortnames.insert(shortname, &item.path)
        {
            return Err(LoadError::DuplicateShortname {
                shortname: shortname.to_owned(),
                first: first.to_path_buf(),
                second: item.path.clone(),
            });
        }

        let key = (item.kind.as_str(), item.locale.as_str(), item.slug.as_str());
        if let Some(first) = slugs.insert(key, &item.path) {
            return Err(LoadError::DuplicateSlug {
                type_name: item.kind.clone(),
                locale: item.locale.clone(),
                slug: item.slug.clone(),
                first: first.to_path_buf(),
                second: item.path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDetails;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_scan_layout() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "post/hello.md", "");
        write(root, "post/trip/post.md", "");
        write(root, "post/trip/photo.jpg", "");
        write(root, "post/about/index.md", "");
        write(root, "post/empty/notes.txt", "");
        write(root, "post/.hidden.md", "");
        write(root, ".drafts/post.md", "");
        write(root, "review/dune.md", "");
        write(root, "readme.md", "");

        let refs: Vec<_> = scan(root)
            .into_iter()
            .map(|r| (r.type_name, r.slug))
            .collect();
        assert_eq!(
            refs,
            [
                ("post".to_owned(), "about".to_owned()),
                ("post".to_owned(), "hello".to_owned()),
                ("post".to_owned(), "trip".to_owned()),
                ("review".to_owned(), "dune".to_owned()),
            ]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        assert!(scan(Path::new("/nonexistent/quire/content")).is_empty());
    }

    #[test]
    fn test_bundle_prefers_post_md() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "post/trip/index.md", "");
        let post = write(temp.path(), "post/trip/post.md", "");

        let refs = scan(temp.path());
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, post);
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path(Path::new("post/hello.md")), "hello");
        assert_eq!(slug_from_path(Path::new("post/trip/post.md")), "trip");
        assert_eq!(slug_from_path(Path::new("post/trip/index.md")), "trip");
    }

    #[test]
    fn test_load_source() {
        let types = TypeRegistry::with_builtins();
        let loader = Loader::new(&types, "en");
        let item = loader
            .load_source(
                Path::new("review/dune.md"),
                "review",
                "dune",
                "---\ntitle: Dune\nrating: 9\ntags: Books\n---\nSpice.\n",
            )
            .unwrap();

        assert_eq!(item.kind, "review");
        assert_eq!(item.title, "Dune");
        assert_eq!(item.locale, "en");
        assert_eq!(item.url, "/reviews/dune/");
        assert_eq!(item.icon(), "⭐");
        assert_eq!(item.raw_body, "Spice.\n");
        assert_eq!(item.body_line, 5);
        assert_eq!(
            item.details,
            ItemDetails::Review {
                rating: Some(9.0),
                max_rating: 10.0
            }
        );
        assert!(item.rendered_body.is_none());
        assert!(item.fingerprint.is_none());
    }

    #[test]
    fn test_load_source_locale_override() {
        let mut types = TypeRegistry::new();
        types
            .register(Box::new(crate::kinds::GenericType::new(
                crate::TypeDescriptor::new("post", "📝")
                    .with_url_slug(Some("posts"))
                    .with_localized_slug("de", "beitraege"),
            )))
            .unwrap();
        let loader = Loader::new(&types, "en");
        let item = loader
            .load_source(Path::new("post/hallo.md"), "post", "hallo", "---\nlocale: de\n---\n")
            .unwrap();
        assert_eq!(item.locale, "de");
        assert_eq!(item.url, "/beitraege/hallo/");
    }

    #[test]
    fn test_load_item_unknown_type() {
        let types = TypeRegistry::with_builtins();
        let loader = Loader::new(&types, "en");
        let err = loader
            .load_item(Path::new("recipe/soup.md"), "recipe")
            .unwrap_err();
        assert!(
            matches!(err, LoadError::UnknownType { ref type_name, .. } if type_name == "recipe")
        );
    }

    #[test]
    fn test_load_item_malformed_frontmatter() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "post/bad.md", "no header here\n");
        let types = TypeRegistry::with_builtins();
        let err = Loader::new(&types, "en")
            .load_item(&path, "post")
            .unwrap_err();

        assert!(matches!(err, LoadError::MalformedFrontmatter { .. }));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_load_item_missing_file() {
        let types = TypeRegistry::with_builtins();
        let err = Loader::new(&types, "en")
            .load_item(Path::new("/nonexistent/post/x.md"), "post")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_review() {
        let types = TypeRegistry::with_builtins();
        let err = Loader::new(&types, "en")
            .load_source(
                Path::new("review/x.md"),
                "review",
                "x",
                "---\nrating: 12\n---\n",
            )
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidItem { .. }));
    }

    #[test]
    fn test_load_all() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "post/a.md", "---\ntitle: A\nshortname: a\n---\nA");
        write(temp.path(), "post/b/post.md", "---\ndraft: true\n---\nB");
        write(temp.path(), "micro/c.md", "---\n---\nC");

        let types = TypeRegistry::with_builtins();
        let items = Loader::new(&types, "en").load_all(temp.path()).unwrap();

        let summary: Vec<_> = items
            .iter()
            .map(|i| (i.kind.as_str(), i.slug.as_str(), i.url.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                ("micro", "c", "/micro/c/"),
                ("post", "a", "/posts/a/"),
                ("post", "b", "/posts/b/"),
            ]
        );
        assert!(items[2].is_draft());
    }

    #[test]
    fn test_load_all_unknown_type_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "recipe/soup.md", "---\n---\n");

        let types = TypeRegistry::with_builtins();
        let err = Loader::new(&types, "en").load_all(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownType { .. }));
    }

    #[test]
    fn test_load_all_duplicate_shortname() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "post/a.md", "---\nshortname: same\n---\n");
        write(temp.path(), "micro/b.md", "---\nshortname: same\n---\n");

        let types = TypeRegistry::with_builtins();
        let err = Loader::new(&types, "en").load_all(temp.path()).unwrap_err();
        assert!(
            matches!(err, LoadError::DuplicateShortname { ref shortname, .. } if shortname == "same")
        );
    }

    #[test]
    fn test_load_all_duplicate_slug() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "post/trip.md", "---\n---\n");
        write(temp.path(), "post/trip/post.md", "---\n---\n");

        let types = TypeRegistry::with_builtins();
        let err = Loader::new(&types, "en").load_all(temp.path()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateSlug { ref slug, .. } if slug == "trip"));
    }

    #[test]
    fn test_same_slug_different_locale() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "post/trip.md", "---\n---\n");
        write(temp.path(), "post/trip/post.md", "---\nlocale: de\n---\n");

        let types = TypeRegistry::with_builtins();
        let items = Loader::new(&types, "en").load_all(temp.path()).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_load_all_missing_root() {
        let types = TypeRegistry::with_builtins();
        let items = Loader::new(&types, "en")
            .load_all(Path::new("/nonexistent/quire"))
            .unwrap();
        assert!(items.is_empty());
    }
}
