//! Shortcode registry, parser and expander for quire.
//!
//! Shortcodes are tags embedded in Markdown bodies that expand into HTML
//! fragments:
//!
//! ```text
//! {{< youtube "dQw4w9WgXcQ" >}}                      inline
//! {{< spoiler "Ending" >}} ... {{< /spoiler >}}        block
//! ```
//!
//! Arguments are whitespace-separated bare words or double-quoted strings;
//! `key="value"` tokens are keyword arguments. Tags inside fenced code blocks
//! are left alone.
//!
//! # Architecture
//!
//! - [`ShortcodeRegistry`]: name to [`ShortcodeDefinition`] mapping, plus the
//!   global version folded into content fingerprints
//! - [`Expander`]: scans a body and splices in rendered fragments
//! - [`Placeholder`]: deferred output of `link` and `related`, resolved after
//!   every item is loaded
//!
//! # Example
//!
//! ```
//! use quire_shortcodes::{Expander, ShortcodeRegistry};
//!
//! let registry = ShortcodeRegistry::with_builtins(1);
//! let expansion = Expander::new(&registry)
//!     .expand("Watch: {{< youtube id=\"abc\" >}}")
//!     .unwrap();
//!
//! assert!(expansion.output.contains("youtube.com/embed/abc"));
//! ```

mod builtins;
mod definition;
mod error;
mod escape;
mod expander;
mod fence;
mod parser;
mod placeholder;
mod registry;

pub use definition::{
    BodyMode, Keyword, RenderFn, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition,
};
pub use error::{ExpandError, Location, ShortcodeError};
pub use escape::{escape_html, unescape_html};
pub use expander::{Expander, Expansion, scan_invocations};
pub use placeholder::{Placeholder, link_targets};
pub use registry::ShortcodeRegistry;
