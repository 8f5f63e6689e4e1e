//! Build pipeline for quire sites.
//!
//! Turns a content tree into rendered item bodies plus a [`SiteIndex`] for
//! the template stage:
//!
//! - [`RenderCache`]: fingerprint-keyed memo of shortcode expansion and
//!   Markdown rendering, persisted between builds
//! - [`SiteIndex`]: per-build lookups by shortname, tag and type, and
//!   related-content ranking
//! - [`Resolver`]: second pass replacing link and related placeholders
//! - [`Pipeline`]: load, render, index, resolve
//!
//! # Example
//!
//! ```no_run
//! use quire_config::Config;
//! use quire_site::Pipeline;
//!
//! let config = Config::load(None, None)?;
//! let output = Pipeline::new(&config)?.build()?;
//! for item in &output.items {
//!     println!("{} -> {}", item.url, item.title);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod fingerprint;
mod index;
mod markdown;
mod pipeline;
mod render_cache;
mod resolver;

pub use error::{BuildError, SkippedItem, Warning};
pub use fingerprint::fingerprint;
pub use index::{IndexEntry, SiteIndex};
pub use markdown::render_markdown;
pub use pipeline::{BuildOutput, BuildReport, Pipeline};
pub use render_cache::{CacheEntry, ItemRenderer, RenderCache, Rendered};
pub use resolver::{Resolved, Resolver};
