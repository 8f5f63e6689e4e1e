//! Build errors and warnings.

use std::fmt;
use std::path::PathBuf;

use quire_content::{LoadError, RegistryError};
use quire_shortcodes::ExpandError;

/// Error that stops a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Type registry could not be assembled from the configuration.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A content file failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// A body failed to expand under the abort policy.
    #[error(transparent)]
    Expand(#[from] ExpandError),
}

/// Problem reported on a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Internal link to a shortname no published item declares.
    BrokenLink { path: PathBuf, shortname: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenLink { path, shortname } => {
                write!(f, "{}: broken link to `{shortname}`", path.display())
            }
        }
    }
}

/// Item dropped under the skip policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub path: PathBuf,
    /// Rendered error message.
    pub reason: String,
}
