//! Content loading and type registry errors.

use std::path::PathBuf;

/// Type registry error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A type with this name is already registered.
    #[error("content type `{0}` is already registered")]
    DuplicateType(String),
    /// No type with this name is registered.
    #[error("unknown content type `{0}`")]
    UnknownType(String),
}

/// Error raised while loading content files.
///
/// Every variant is structural: the build cannot continue.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The header block is absent or not valid YAML.
    #[error("{}: malformed frontmatter: {message}", path.display())]
    MalformedFrontmatter { path: PathBuf, message: String },
    /// The file lives under a directory that names no registered type.
    #[error("{}: unknown content type `{type_name}`", path.display())]
    UnknownType { path: PathBuf, type_name: String },
    /// Two items declare the same shortname.
    #[error(
        "duplicate shortname `{shortname}` in {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateShortname {
        shortname: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// Two items of one type and locale share a slug.
    #[error(
        "duplicate slug `{slug}` for {type_name} ({locale}) in {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateSlug {
        type_name: String,
        locale: String,
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// A field value the item's type rejects.
    #[error("{}: {message}", path.display())]
    InvalidItem { path: PathBuf, message: String },
    /// The file could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
