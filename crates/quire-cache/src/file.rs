//! File-based cache store.
//!
//! [`FileStore`] keeps every blob as a single file inside a root directory.
//! Writes go to a sibling temporary file first and are renamed into place, so
//! an interrupted build leaves either the old blob or the new one, never a
//! truncated mix.
//!
//! On construction, [`FileStore`] validates a `VERSION` file in the root. If
//! the version mismatches or is missing, the whole directory is wiped and
//! recreated so blobs written by an incompatible build are never read.

use std::fs;
use std::path::{Path, PathBuf};

use crate::CacheStore;

/// File-based [`CacheStore`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the store format version
/// +-- renders.json       # blob "renders.json"
/// ```
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a file store at `root`, validating the format version.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl CacheStore for FileStore {
    fn read(&self, name: &str) -> Option<Vec<u8>> {
        match fs::read(self.path_for(name)) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(name, error = %e, "failed to read cache blob");
                None
            }
        }
    }

    fn write(&self, name: &str, value: &[u8]) {
        let path = self.path_for(name);
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(name, error = %e, "failed to create cache directory");
            return;
        }

        let tmp = path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, value) {
            tracing::warn!(name, error = %e, "failed to write cache blob");
            return;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            tracing::warn!(name, error = %e, "failed to move cache blob into place");
            let _ = fs::remove_file(&tmp);
        }
    }
}

/// Validate the store version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("cache"), "v1");

        store.write("renders.json", b"{\"entries\":{}}");
        assert_eq!(
            store.read("renders.json"),
            Some(b"{\"entries\":{}}".to_vec())
        );
    }

    #[test]
    fn test_file_store_read_missing() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("cache"), "v1");

        assert_eq!(store.read("nothing"), None);
    }

    #[test]
    fn test_file_store_overwrite_replaces_blob() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("cache"), "v1");

        store.write("blob", b"first version with more bytes");
        store.write("blob", b"second");

        assert_eq!(store.read("blob"), Some(b"second".to_vec()));
        assert!(!tmp.path().join("cache/blob.tmp").exists());
    }

    #[test]
    fn test_version_match_keeps_blobs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileStore::new(root.clone(), "v1").write("blob", b"preserved");

        let reopened = FileStore::new(root, "v1");
        assert_eq!(reopened.read("blob"), Some(b"preserved".to_vec()));
    }

    #[test]
    fn test_version_mismatch_wipes_blobs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileStore::new(root.clone(), "v1").write("blob", b"stale");

        let reopened = FileStore::new(root.clone(), "v2");
        assert_eq!(reopened.read("blob"), None);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v2");
    }

    #[test]
    fn test_missing_version_file_wipes_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("orphan"), b"stale data").unwrap();

        let store = FileStore::new(root.clone(), "v1");
        assert_eq!(store.read("orphan"), None);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v1");
    }

    #[test]
    fn test_nonexistent_root_is_created() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/cache");
        assert!(!root.exists());

        let store = FileStore::new(root.clone(), "v1");

        assert!(root.exists());
        assert_eq!(store.root(), root.as_path());
    }
}
