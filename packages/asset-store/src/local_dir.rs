//! Asset store backed by a directory on the local disk.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use crate::{AssetStore, AssetStream, Result, StoreError};

/// A read-only asset store rooted at a local directory.
///
/// Asset paths are resolved relative to the root; paths that would escape
/// it (`..`, absolute components) are rejected. Listings are sorted by name
/// so that repeated queries see a stable order.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    /// Open a store rooted at `root`, which must be an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let attr = fs::metadata(&root).map_err(|source| StoreError::RootPathInvalid {
            path: root.clone(),
            source,
        })?;

        if !attr.is_dir() {
            return Err(StoreError::RootPathInvalid {
                path: root,
                source: io::Error::other("root path must be a directory"),
            });
        }

        match root.canonicalize() {
            Ok(root) => Ok(Self { root }),
            Err(source) => Err(StoreError::RootPathInvalid { path: root, source }),
        }
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the whole tree and return the asset path of every regular file.
    ///
    /// This gives callers an explicit index of which paths are blobs, for
    /// trees whose file names do not all carry an extension.
    pub fn file_index(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io_err) => StoreError::Io(io_err),
                None => StoreError::Io(io::Error::other("filesystem loop while indexing")),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            match asset_path_of(relative) {
                Some(path) => files.push(path),
                None => log::warn!("Skipping non-UTF-8 asset {}", entry.path().display()),
            }
        }
        log::debug!("Indexed {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let trimmed = path.trim_matches('/');
        let mut resolved = self.root.clone();
        if trimmed.is_empty() {
            return Ok(resolved);
        }

        for segment in trimmed.split('/') {
            match Path::new(segment).components().next() {
                Some(Component::Normal(_)) if !segment.contains('\\') => resolved.push(segment),
                _ => {
                    return Err(StoreError::invalid_path(
                        path,
                        format!("segment '{}' is not a plain name", segment),
                    ))
                }
            }
        }
        Ok(resolved)
    }
}

fn asset_path_of(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    Some(segments.join("/"))
}

fn missing_or_io(path: &str, err: io::Error) -> StoreError {
    if err.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound {
            path: path.to_string(),
        }
    } else {
        StoreError::Io(err)
    }
}

impl AssetStore for LocalAssetStore {
    fn list(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.resolve(path)?;
        log::debug!("Listing {}...", dir.display());

        let attr = fs::metadata(&dir).map_err(|e| missing_or_io(path, e))?;
        if !attr.is_dir() {
            return Err(StoreError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("Skipping non-UTF-8 entry {:?} in {}", raw, dir.display()),
            }
        }
        names.sort();
        Ok(names)
    }

    fn open(&self, path: &str) -> Result<AssetStream> {
        let file_path = self.resolve(path)?;
        log::debug!("Opening {}...", file_path.display());

        let attr = fs::metadata(&file_path).map_err(|e| missing_or_io(path, e))?;
        if attr.is_dir() {
            return Err(StoreError::NotAFile {
                path: path.to_string(),
            });
        }

        let file = File::open(&file_path).map_err(|e| missing_or_io(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Cats")).unwrap();
        fs::create_dir_all(dir.path().join("Dogs")).unwrap();
        fs::write(dir.path().join("Cats/Grumpy Cat.jpg"), b"meow").unwrap();
        fs::write(dir.path().join("Cats/README"), b"docs").unwrap();
        fs::write(dir.path().join("Dogs/Good Boy.jpg"), b"woof").unwrap();
        dir
    }

    #[test]
    fn new_rejects_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = LocalAssetStore::new(dir.path().join("nope"));
        assert!(matches!(result, Err(StoreError::RootPathInvalid { .. })));
    }

    #[test]
    fn new_rejects_file_root() {
        let dir = sample_tree();
        let result = LocalAssetStore::new(dir.path().join("Cats/README"));
        assert!(matches!(result, Err(StoreError::RootPathInvalid { .. })));
    }

    #[test]
    fn list_is_sorted() {
        let dir = sample_tree();
        let store = LocalAssetStore::new(dir.path()).unwrap();
        assert_eq!(store.list("").unwrap(), vec!["Cats", "Dogs"]);
        assert_eq!(store.list("Cats").unwrap(), vec!["Grumpy Cat.jpg", "README"]);
    }

    #[test]
    fn list_missing_and_file() {
        let dir = sample_tree();
        let store = LocalAssetStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.list("Birds"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.list("Cats/README"),
            Err(StoreError::NotADirectory { .. })
        ));
    }

    #[test]
    fn open_reads_file() {
        let dir = sample_tree();
        let store = LocalAssetStore::new(dir.path()).unwrap();
        let mut buf = Vec::new();
        store
            .open("Dogs/Good Boy.jpg")
            .unwrap()
            .read_to_end(&mut buf)
            .unwrap();
        assert_eq!(buf, b"woof");
    }

    #[test]
    fn open_directory_and_missing() {
        let dir = sample_tree();
        let store = LocalAssetStore::new(dir.path()).unwrap();
        assert!(matches!(store.open("Cats"), Err(StoreError::NotAFile { .. })));
        assert!(matches!(
            store.open("Cats/Nyan.gif"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn traversal_is_rejected() {
        let dir = sample_tree();
        let store = LocalAssetStore::new(dir.path().join("Cats")).unwrap();
        assert!(matches!(
            store.list("../Dogs"),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.open("./README"),
            Err(StoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn file_index_lists_only_files() {
        let dir = sample_tree();
        let store = LocalAssetStore::new(dir.path()).unwrap();
        assert_eq!(
            store.file_index().unwrap(),
            vec!["Cats/Grumpy Cat.jpg", "Cats/README", "Dogs/Good Boy.jpg"]
        );
    }
}
