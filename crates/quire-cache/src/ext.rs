//! Extension trait for [`CacheStore`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheStore;

/// Typed JSON access for [`CacheStore`].
///
/// Implemented as default methods on an extension trait so that
/// [`CacheStore`] stays object-safe and implementors only handle raw bytes.
///
/// # Example
///
/// ```
/// use quire_cache::{CacheStoreExt, NullStore};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Entry { html: String }
///
/// let store = NullStore;
/// store.write_json("renders", &Entry { html: "<p>hi</p>".into() });
/// let entry: Option<Entry> = store.read_json("renders");
/// assert!(entry.is_none());
/// ```
pub trait CacheStoreExt: CacheStore {
    /// Read and deserialize a JSON blob.
    ///
    /// Returns `None` when the blob is missing or does not deserialize; a
    /// corrupt blob is logged and treated as absent.
    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let bytes = self.read(name)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(name, error = %e, "ignoring corrupt cache blob");
                None
            }
        }
    }

    /// Serialize a value as JSON and store it.
    ///
    /// Silently does nothing if serialization fails.
    fn write_json<T: Serialize>(&self, name: &str, value: &T) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.write(name, &bytes);
        }
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        html: String,
        deps: Vec<String>,
    }

    #[test]
    fn test_json_round_trip_through_file_store() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().to_path_buf(), "v1");
        let sample = Sample {
            html: "<p>hello</p>".to_owned(),
            deps: vec!["alpha".to_owned()],
        };

        store.write_json("sample.json", &sample);

        assert_eq!(store.read_json::<Sample>("sample.json"), Some(sample));
    }

    #[test]
    fn test_corrupt_json_reads_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().to_path_buf(), "v1");

        store.write("sample.json", b"{ not json");

        assert_eq!(store.read_json::<Sample>("sample.json"), None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let tmp = tempfile::tempdir().unwrap();
        let store: Box<dyn CacheStore> =
            Box::new(FileStore::new(tmp.path().to_path_buf(), "v1"));

        store.write_json("n.json", &42_u32);
        assert_eq!(store.read_json::<u32>("n.json"), Some(42));
    }
}
