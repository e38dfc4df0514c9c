//! # assetfs-bridge
//!
//! Presents a flat, read-only asset namespace as a browsable document tree:
//!
//! - `DocumentId`: slash-delimited identifier, equal to the asset path
//! - `KindPolicy`: decides whether an identifier is a directory or a file
//! - `TreeQuery`: metadata for one document and for a directory's children
//! - `SearchEngine`: breadth-first name search
//! - `RecentsLedger`: bounded most-recent-first list in a preference store
//! - `ContentStreamer`: opens a document and pumps its bytes through a pipe
//! - `Bridge`: the facade tying the above together behind one root
//!
//! The asset store is the only source of truth for the tree. No listing is
//! cached between calls and the bridge mutates nothing except the recents
//! list.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use assetfs_bridge::{Bridge, BridgeConfig};
//! use assetfs_store::{InMemoryAssetStore, InMemoryPreferences};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> assetfs_bridge::Result<()> {
//! let assets = InMemoryAssetStore::new()
//!     .with_asset("Cats/Grumpy Cat.jpg", b"meow".to_vec())
//!     .with_asset("Dogs/Good Boy.jpg", b"woof".to_vec());
//!
//! let bridge = Bridge::builder(Arc::new(assets), Arc::new(InMemoryPreferences::new()))
//!     .config(BridgeConfig::default())
//!     .build()?;
//!
//! let hits = bridge.search("assets", "cat")?;
//! assert_eq!(hits[0].display_name, "Grumpy Cat");
//! # Ok(())
//! # }
//! ```

mod bridge;
mod config;
pub mod document_id;
mod error;
mod kind;
mod metadata;
pub mod mime;
mod recents;
mod search;
mod streamer;
#[cfg(test)]
mod test_support;
mod tree;

pub use bridge::{Bridge, BridgeBuilder};
pub use config::{
    BridgeConfig, KindPolicyConfig, DEFAULT_CHUNK_SIZE, DEFAULT_PIPE_DEPTH,
    DEFAULT_RECENTS_CAPACITY,
};
pub use document_id::DocumentId;
pub use error::{Error, Result};
pub use kind::{ExtensionPolicy, IndexedPolicy, KindPolicy, NodeKind};
pub use metadata::{DocumentMetadata, RootDescriptor};
pub use recents::RecentsLedger;
pub use search::SearchEngine;
pub use streamer::{ContentStreamer, ReadableHandle, TransferId, TransferState, TransferStatus};
pub use tree::TreeQuery;
