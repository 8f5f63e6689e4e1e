//! Content item model and type registry for quire.
//!
//! Content lives in Markdown files with a YAML frontmatter block. The
//! directory directly under the content root names the item's type; every
//! type is registered in the [`TypeRegistry`] with a [`ContentKind`] that
//! supplies its icon, URL pattern, listing order and type-specific fields.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use quire_content::{Loader, TypeRegistry};
//!
//! let types = TypeRegistry::with_builtins();
//! let item = Loader::new(&types, "en")
//!     .load_source(
//!         Path::new("post/hello.md"),
//!         "post",
//!         "hello",
//!         "---\ntitle: Hello\n---\nFirst post.\n",
//!     )
//!     .unwrap();
//!
//! assert_eq!(item.url, "/posts/hello/");
//! assert_eq!(item.icon(), "📝");
//! ```

mod error;
mod frontmatter;
mod item;
mod kinds;
mod loader;
mod registry;

pub use error::{LoadError, RegistryError};
pub use frontmatter::{Document, Frontmatter, FrontmatterError, parse_date, parse_document};
pub use item::{ContentItem, DEFAULT_TITLE, ItemDetails};
pub use kinds::{
    Bookmark, ContentKind, DEFAULT_MAX_RATING, GenericType, Micro, Music, Page, Post, Review,
    TypeDescriptor, by_date_desc,
};
pub use loader::{Loader, SourceRef, scan};
pub use registry::TypeRegistry;
