//! The read-only asset store interface.

use std::io::Read;
use std::sync::Arc;

use crate::Result;

/// A byte stream over the content of one asset.
pub type AssetStream = Box<dyn Read + Send>;

/// A read-only collection of named blobs addressed by slash-delimited paths.
///
/// The namespace is flat: a store has no explicit directory markers beyond
/// what `list` reports. The empty path names the store root.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn AssetStore>`.
pub trait AssetStore: Send + Sync {
    /// List the immediate child names of a directory path.
    ///
    /// # Returns
    ///
    /// * `Ok(names)` - The child names, in the store's own order.
    /// * `Err(StoreError::NotFound)` - Nothing exists at `path`.
    /// * `Err(StoreError::NotADirectory)` - `path` names a blob.
    fn list(&self, path: &str) -> Result<Vec<String>>;

    /// Open the blob at `path` for reading.
    ///
    /// # Returns
    ///
    /// * `Ok(stream)` - A reader over the blob's bytes.
    /// * `Err(StoreError::NotFound)` - Nothing exists at `path`.
    /// * `Err(StoreError::NotAFile)` - `path` names a directory.
    fn open(&self, path: &str) -> Result<AssetStream>;
}

// Blanket implementations for references and smart pointers

impl<T: AssetStore + ?Sized> AssetStore for &T {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        (**self).list(path)
    }

    fn open(&self, path: &str) -> Result<AssetStream> {
        (**self).open(path)
    }
}

impl<T: AssetStore + ?Sized> AssetStore for Box<T> {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        self.as_ref().list(path)
    }

    fn open(&self, path: &str) -> Result<AssetStream> {
        self.as_ref().open(path)
    }
}

impl<T: AssetStore + ?Sized> AssetStore for Arc<T> {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        self.as_ref().list(path)
    }

    fn open(&self, path: &str) -> Result<AssetStream> {
        self.as_ref().open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryAssetStore, StoreError};

    #[test]
    fn object_safety_works() {
        let store = InMemoryAssetStore::new().with_asset("Cats/Grumpy Cat.jpg", b"meow".to_vec());
        let shared: Arc<dyn AssetStore> = Arc::new(store);

        assert_eq!(shared.list("").unwrap(), vec!["Cats".to_string()]);

        let mut buf = Vec::new();
        shared
            .open("Cats/Grumpy Cat.jpg")
            .unwrap()
            .read_to_end(&mut buf)
            .unwrap();
        assert_eq!(buf, b"meow");
    }

    #[test]
    fn boxed_store_delegates() {
        let store: Box<dyn AssetStore> = Box::new(InMemoryAssetStore::new());
        assert!(matches!(
            store.open("missing.png"),
            Err(StoreError::NotFound { .. })
        ));
    }
}
