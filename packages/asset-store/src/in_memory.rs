//! In-memory asset store.

use std::io::Cursor;

use bytes::Bytes;

use crate::{AssetStore, AssetStream, Result, StoreError};

/// An asset store holding its blobs in memory.
///
/// Blobs are kept in insertion order. Directories exist implicitly: a path
/// is a directory when at least one blob lives beneath it. Listings return
/// child names in the order they were first seen while scanning the blobs.
///
/// # Example
///
/// ```rust
/// use assetfs_store::{AssetStore, InMemoryAssetStore};
///
/// let store = InMemoryAssetStore::new()
///     .with_asset("Cats/Grumpy Cat.jpg", b"meow".to_vec())
///     .with_asset("Dogs/Good Boy.jpg", b"woof".to_vec());
///
/// assert_eq!(store.list("").unwrap(), vec!["Cats", "Dogs"]);
/// assert_eq!(store.list("Cats").unwrap(), vec!["Grumpy Cat.jpg"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetStore {
    assets: Vec<(String, Bytes)>,
}

impl InMemoryAssetStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self { assets: Vec::new() }
    }

    /// Add a blob, consuming and returning the store.
    #[must_use]
    pub fn with_asset(mut self, path: &str, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    /// Add or replace a blob.
    pub fn insert(&mut self, path: &str, data: impl Into<Bytes>) {
        let path = normalize(path).to_string();
        let data = data.into();
        match self.assets.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = data,
            None => self.assets.push((path, data)),
        }
    }

    /// Remove a blob. Returns whether it existed.
    pub fn remove(&mut self, path: &str) -> bool {
        let path = normalize(path);
        let before = self.assets.len();
        self.assets.retain(|(p, _)| p != path);
        self.assets.len() != before
    }

    /// Number of blobs in the store.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn is_blob(&self, path: &str) -> bool {
        self.assets.iter().any(|(p, _)| p == path)
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// The remainder of `asset` below `dir`, if `asset` lives beneath it.
fn strip_dir<'a>(asset: &'a str, dir: &str) -> Option<&'a str> {
    if dir.is_empty() {
        return Some(asset);
    }
    asset
        .strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
}

impl AssetStore for InMemoryAssetStore {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        let dir = normalize(path);

        if self.is_blob(dir) {
            return Err(StoreError::NotADirectory {
                path: dir.to_string(),
            });
        }

        let mut names: Vec<String> = Vec::new();
        for (asset, _) in &self.assets {
            let Some(rest) = strip_dir(asset, dir) else {
                continue;
            };
            let name = rest.split('/').next().unwrap_or(rest);
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() && !dir.is_empty() {
            return Err(StoreError::NotFound {
                path: dir.to_string(),
            });
        }

        log::debug!("Listed {} entries under '{}'", names.len(), dir);
        Ok(names)
    }

    fn open(&self, path: &str) -> Result<AssetStream> {
        let path = normalize(path);

        if let Some((_, data)) = self.assets.iter().find(|(p, _)| p == path) {
            return Ok(Box::new(Cursor::new(data.clone())));
        }

        if path.is_empty() || self.assets.iter().any(|(p, _)| strip_dir(p, path).is_some()) {
            return Err(StoreError::NotAFile {
                path: path.to_string(),
            });
        }

        Err(StoreError::NotFound {
            path: path.to_string(),
        })
    }
}
