//! # assetfs-store
//!
//! The storage collaborators of the assetfs bridge:
//!
//! - [`AssetStore`]: a read-only, flat namespace of blobs addressed by
//!   slash-delimited paths, with `list` and `open`.
//! - [`PreferenceStore`]: a string key-value store used to persist small
//!   pieces of state such as the recently-opened list.
//!
//! Neither interface knows anything about documents, kinds or display
//! names; that lives in `assetfs-bridge`.
//!
//! # Example
//!
//! ```rust
//! use assetfs_store::{AssetStore, InMemoryAssetStore, InMemoryPreferences, PreferenceStore};
//!
//! let assets = InMemoryAssetStore::new().with_asset("Cats/Grumpy Cat.jpg", b"meow".to_vec());
//! assert_eq!(assets.list("Cats").unwrap(), vec!["Grumpy Cat.jpg"]);
//!
//! let prefs = InMemoryPreferences::new();
//! prefs.put_string("recents", "Cats/Grumpy Cat.jpg").unwrap();
//! ```

pub use bytes::Bytes;

mod asset;
mod error;
mod in_memory;
mod local_dir;
mod prefs;

pub use asset::{AssetStore, AssetStream};
pub use error::{Result, StoreError};
pub use in_memory::InMemoryAssetStore;
pub use local_dir::LocalAssetStore;
pub use prefs::{InMemoryPreferences, JsonFilePreferences, PreferenceStore};
