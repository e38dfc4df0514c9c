//! Hierarchical queries over the inferred tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use assetfs_store::AssetStore;

use crate::document_id::{display_name_as, DocumentId};
use crate::kind::{KindPolicy, NodeKind};
use crate::metadata::DocumentMetadata;
use crate::mime::{mime_matches, mime_type_of};
use crate::recents::RecentsLedger;
use crate::{Error, Result};

/// Answers "what is X" and "what is under X".
///
/// Files are described from their identifier alone; the asset store is only
/// consulted to list directories.
#[derive(Clone)]
pub struct TreeQuery {
    assets: Arc<dyn AssetStore>,
    policy: Arc<dyn KindPolicy>,
    recents: Option<Arc<RecentsLedger>>,
    root: DocumentId,
    root_title: String,
}

impl TreeQuery {
    /// Create an engine whose root directory is `root`, displayed as
    /// `root_title`.
    pub fn new(
        assets: Arc<dyn AssetStore>,
        policy: Arc<dyn KindPolicy>,
        root: DocumentId,
        root_title: impl Into<String>,
    ) -> Self {
        Self {
            assets,
            policy,
            recents: None,
            root,
            root_title: root_title.into(),
        }
    }

    /// Report last-access times from `recents` as last-modified times.
    #[must_use]
    pub fn with_recents(mut self, recents: Arc<RecentsLedger>) -> Self {
        self.recents = Some(recents);
        self
    }

    /// The root directory identifier.
    pub fn root(&self) -> &DocumentId {
        &self.root
    }

    /// The kind of `id` under this engine's policy.
    pub fn kind_of(&self, id: &DocumentId) -> NodeKind {
        if *id == self.root {
            return NodeKind::Directory;
        }
        self.policy.kind_of(id.as_str())
    }

    /// Metadata for `id`.
    ///
    /// Directories other than the root are confirmed by listing them; a
    /// failed listing is `NotFound`. Files are not looked up.
    pub fn get_metadata(&self, id: &DocumentId) -> Result<DocumentMetadata> {
        if self.kind_of(id).is_directory() && *id != self.root {
            self.assets
                .list(id.as_str())
                .map_err(|e| Error::from_query(id.as_str(), e))?;
        }
        self.describe(id)
    }

    /// Metadata for every child of `parent`, in the store's listing order.
    pub fn list_children(&self, parent: &DocumentId) -> Result<Vec<DocumentMetadata>> {
        let names = self
            .assets
            .list(parent.as_str())
            .map_err(|e| Error::from_query(parent.as_str(), e))?;

        let mut children = Vec::with_capacity(names.len());
        for name in names {
            match parent.child(&name) {
                Ok(child) => children.push(self.describe(&child)?),
                Err(e) => log::warn!("Skipping child '{}' of '{}': {}", name, parent, e),
            }
        }
        log::debug!("Listed {} children of '{}'", children.len(), parent);
        Ok(children)
    }

    /// Child identifiers of `parent`, without describing them.
    pub(crate) fn child_ids(&self, parent: &DocumentId) -> Result<Vec<DocumentId>> {
        let names = self
            .assets
            .list(parent.as_str())
            .map_err(|e| Error::from_query(parent.as_str(), e))?;
        Ok(names
            .iter()
            .filter_map(|name| match parent.child(name) {
                Ok(child) => Some(child),
                Err(e) => {
                    log::warn!("Skipping child '{}' of '{}': {}", name, parent, e);
                    None
                }
            })
            .collect())
    }

    /// Metadata for `id` if its parent still lists it.
    ///
    /// Unlike [`get_metadata`](Self::get_metadata), files are checked too.
    pub fn resolve(&self, id: &DocumentId) -> Result<DocumentMetadata> {
        if *id == self.root {
            return self.describe(id);
        }
        let parent = id.parent().ok_or_else(|| Error::not_found(id.as_str()))?;
        let names = self
            .assets
            .list(parent.as_str())
            .map_err(|e| Error::from_query(id.as_str(), e))?;
        if !names.iter().any(|name| name == id.name()) {
            return Err(Error::not_found(id.as_str()));
        }
        self.describe(id)
    }

    /// Metadata for each identifier that still exists in the store.
    ///
    /// Existence is checked by listing each distinct parent once; anything
    /// whose parent is gone or no longer lists it is dropped.
    pub fn resolve_existing(&self, ids: &[DocumentId]) -> Vec<DocumentMetadata> {
        let mut listings: HashMap<DocumentId, Option<HashSet<String>>> = HashMap::new();
        let mut resolved = Vec::with_capacity(ids.len());

        for id in ids {
            if *id == self.root {
                if let Ok(meta) = self.describe(id) {
                    resolved.push(meta);
                }
                continue;
            }

            let Some(parent) = id.parent() else {
                continue;
            };
            let listing = listings.entry(parent.clone()).or_insert_with(|| {
                match self.assets.list(parent.as_str()) {
                    Ok(names) => Some(names.into_iter().collect()),
                    Err(e) => {
                        log::debug!("Parent '{}' no longer lists: {}", parent, e);
                        None
                    }
                }
            });

            let exists = listing
                .as_ref()
                .is_some_and(|names| names.contains(id.name()));
            if !exists {
                log::debug!("Dropping '{}', no longer in the store", id);
                continue;
            }

            match self.describe(id) {
                Ok(meta) => resolved.push(meta),
                Err(e) => log::warn!("Cannot describe '{}': {}", id, e),
            }
        }
        resolved
    }

    /// Build metadata from the identifier alone.
    pub(crate) fn describe(&self, id: &DocumentId) -> Result<DocumentMetadata> {
        let kind = self.kind_of(id);
        let display_name = if *id == self.root {
            self.root_title.clone()
        } else {
            display_name_as(id.as_str(), kind)?
        };
        let mime_type = mime_type_of(id.as_str(), kind);

        Ok(DocumentMetadata {
            id: id.clone(),
            display_name,
            kind,
            mime_type: mime_type.to_string(),
            size: None,
            last_modified: self.last_accessed(id, kind),
            thumbnail_supported: kind.is_file() && mime_matches("image/*", mime_type),
            prefers_grid: kind.is_directory(),
        })
    }

    fn last_accessed(&self, id: &DocumentId, kind: NodeKind) -> Option<chrono::DateTime<chrono::Utc>> {
        let recents = self.recents.as_ref().filter(|_| kind.is_file())?;
        match recents.last_accessed(id) {
            Ok(when) => when,
            Err(e) => {
                log::warn!("Cannot read last access time of '{}': {}", id, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for TreeQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeQuery")
            .field("root", &self.root)
            .field("root_title", &self.root_title)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{ExtensionPolicy, IndexedPolicy};
    use assetfs_store::{InMemoryAssetStore, InMemoryPreferences};
    use chrono::{TimeZone, Utc};

    fn id(s: &str) -> DocumentId {
        DocumentId::parse(s).unwrap()
    }

    fn store() -> Arc<InMemoryAssetStore> {
        Arc::new(
            InMemoryAssetStore::new()
                .with_asset("Cats/Grumpy Cat.jpg", b"meow".to_vec())
                .with_asset("Cats/README", b"docs".to_vec())
                .with_asset("Dogs/Good Boy.jpg", b"woof".to_vec()),
        )
    }

    fn engine() -> TreeQuery {
        TreeQuery::new(store(), Arc::new(ExtensionPolicy), DocumentId::store_root(), "Memes")
    }

    #[test]
    fn file_metadata_from_id() {
        let meta = engine().get_metadata(&id("Cats/Grumpy Cat.jpg")).unwrap();
        assert_eq!(meta.display_name, "Grumpy Cat");
        assert_eq!(meta.kind, NodeKind::File);
        assert_eq!(meta.mime_type, "image/jpeg");
        assert!(meta.thumbnail_supported);
        assert!(!meta.prefers_grid);
        assert_eq!(meta.size, None);
        assert_eq!(meta.last_modified, None);
    }

    #[test]
    fn file_metadata_does_not_touch_store() {
        let meta = engine().get_metadata(&id("Cats/Nyan.gif")).unwrap();
        assert_eq!(meta.display_name, "Nyan");
    }

    #[test]
    fn directory_metadata_requires_listing() {
        let meta = engine().get_metadata(&id("Cats")).unwrap();
        assert_eq!(meta.display_name, "Cats");
        assert!(meta.is_directory());
        assert!(meta.prefers_grid);
        assert!(!meta.thumbnail_supported);

        assert!(matches!(
            engine().get_metadata(&id("Birds")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn root_metadata_uses_title() {
        let meta = engine().get_metadata(&DocumentId::store_root()).unwrap();
        assert_eq!(meta.display_name, "Memes");
        assert!(meta.is_directory());
    }

    #[test]
    fn list_children_preserves_store_order() {
        let children = engine().list_children(&id("Cats")).unwrap();
        let names: Vec<_> = children.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names, vec!["Grumpy Cat", "README"]);
        assert_eq!(children[0].id, id("Cats/Grumpy Cat.jpg"));
        // The extension heuristic reads README as a directory.
        assert_eq!(children[1].kind, NodeKind::Directory);
    }

    #[test]
    fn list_children_of_root() {
        let children = engine().list_children(&DocumentId::store_root()).unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.is_directory()));
    }

    #[test]
    fn list_missing_directory_is_not_found() {
        assert!(matches!(
            engine().list_children(&id("Birds")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn indexed_policy_classifies_readme_as_file() {
        let policy = IndexedPolicy::new(["Cats/Grumpy Cat.jpg", "Cats/README", "Dogs/Good Boy.jpg"]);
        let engine = TreeQuery::new(store(), Arc::new(policy), DocumentId::store_root(), "Memes");
        let children = engine.list_children(&id("Cats")).unwrap();
        assert_eq!(children[1].kind, NodeKind::File);
        assert_eq!(children[1].display_name, "README");
        assert_eq!(children[1].mime_type, crate::mime::FALLBACK_MIME_TYPE);
    }

    #[test]
    fn last_modified_comes_from_recents() {
        let recents = Arc::new(RecentsLedger::with_defaults(Arc::new(InMemoryPreferences::new())));
        let when = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        recents.record_access_at(&id("Dogs/Good Boy.jpg"), when).unwrap();

        let engine = engine().with_recents(recents);
        let meta = engine.get_metadata(&id("Dogs/Good Boy.jpg")).unwrap();
        assert_eq!(meta.last_modified, Some(when));
    }

    #[test]
    fn resolve_checks_files_against_parent() {
        let engine = engine();
        assert_eq!(
            engine.resolve(&id("Cats/Grumpy Cat.jpg")).unwrap().display_name,
            "Grumpy Cat"
        );
        assert!(matches!(
            engine.resolve(&id("Cats/Nyan.gif")),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            engine.resolve(&id("Birds/Tweety.png")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn resolve_existing_drops_removed_assets() {
        let ids = vec![
            id("Dogs/Good Boy.jpg"),
            id("Cats/Deleted.jpg"),
            id("Birds/Tweety.png"),
            id("Cats/Grumpy Cat.jpg"),
        ];
        let resolved = engine().resolve_existing(&ids);
        let got: Vec<_> = resolved.iter().map(|m| m.id.clone()).collect();
        assert_eq!(got, vec![id("Dogs/Good Boy.jpg"), id("Cats/Grumpy Cat.jpg")]);
    }
}
