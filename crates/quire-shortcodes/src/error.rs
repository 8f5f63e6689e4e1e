//! Shortcode registration and expansion errors.

use std::fmt;
use std::path::PathBuf;

/// Position of a tag inside a source file.
///
/// Lines and columns are 1-based. Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Source file, when known.
    pub path: Option<PathBuf>,
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}:{}", path.display(), self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

/// Registry error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShortcodeError {
    /// A shortcode with this name is already registered.
    #[error("shortcode `{0}` is already registered")]
    DuplicateShortcode(String),
    /// No shortcode with this name is registered.
    #[error("unknown shortcode `{0}`")]
    UnknownShortcode(String),
    /// The name contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid shortcode name `{0}`")]
    InvalidName(String),
}

/// Error raised while expanding the shortcodes of one body.
///
/// Every variant carries the location of the offending tag.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExpandError {
    /// Tag names a shortcode the registry does not know.
    #[error("{location}: unknown shortcode `{name}`")]
    UnknownShortcode { name: String, location: Location },
    /// Block opener without closer, or closer without opener.
    #[error("{location}: unbalanced shortcode `{name}`: {message}")]
    Unbalanced {
        name: String,
        message: String,
        location: Location,
    },
    /// Tag text does not follow the shortcode grammar.
    #[error("{location}: malformed shortcode tag: {message}")]
    Malformed { message: String, location: Location },
    /// Positional arity or required arguments not satisfied.
    #[error("{location}: shortcode `{name}`: {message}")]
    ArgumentCount {
        name: String,
        message: String,
        location: Location,
    },
    /// Keyword argument the definition does not accept.
    #[error("{location}: shortcode `{name}` does not accept argument `{argument}`")]
    UnexpectedArgument {
        name: String,
        argument: String,
        location: Location,
    },
    /// The render function rejected its arguments.
    #[error("{location}: shortcode `{name}` failed: {message}")]
    Render {
        name: String,
        message: String,
        location: Location,
    },
}

impl ExpandError {
    /// Location of the offending tag.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::UnknownShortcode { location, .. }
            | Self::Unbalanced { location, .. }
            | Self::Malformed { location, .. }
            | Self::ArgumentCount { location, .. }
            | Self::UnexpectedArgument { location, .. }
            | Self::Render { location, .. } => location,
        }
    }

    /// Whether the error points at the site setup rather than one body.
    ///
    /// An unknown shortcode means a plugin is missing; the error policy
    /// never skips it.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::UnknownShortcode { .. })
    }
}
