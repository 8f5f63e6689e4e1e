//! Persistent cache store abstraction for quire.
//!
//! Build caches are loaded once at the start of a build and rewritten once at
//! the end, so the store API deals in whole named blobs rather than individual
//! entries:
//!
//! - [`CacheStore`]: named blob storage that persists between builds
//! - [`CacheStoreExt`]: typed JSON helpers on top of any store
//!
//! # Implementations
//!
//! - [`NullStore`]: No-op implementation (always empty)
//! - [`FileStore`]: One file per blob with format version validation
//!
//! A store never reports errors to its caller. Missing, unreadable or corrupt
//! data reads as `None`, and failed writes are logged. Losing the cache only
//! costs a full rebuild.
//!
//! # Example
//!
//! ```
//! use quire_cache::{CacheStore, NullStore};
//!
//! let store = NullStore;
//! store.write("renders", b"{}");
//! assert_eq!(store.read("renders"), None); // NullStore never keeps anything
//! ```

mod ext;
mod file;

pub use ext::CacheStoreExt;
pub use file::FileStore;

/// Named blob storage that survives between builds.
pub trait CacheStore: Send + Sync {
    /// Read the blob stored under `name`.
    ///
    /// Returns `None` if nothing was stored or the data could not be read.
    fn read(&self, name: &str) -> Option<Vec<u8>>;

    /// Replace the blob stored under `name`.
    ///
    /// The previous contents are discarded entirely.
    fn write(&self, name: &str, value: &[u8]);
}

/// No-op [`CacheStore`] that never stores or retrieves data.
///
/// Use when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl CacheStore for NullStore {
    fn read(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }

    fn write(&self, _name: &str, _value: &[u8]) {}
}
