//! The facade the protocol adapter talks to.

use std::sync::Arc;

use assetfs_store::{AssetStore, PreferenceStore};
use tokio::runtime::Handle;

use crate::config::{BridgeConfig, KindPolicyConfig};
use crate::document_id::DocumentId;
use crate::kind::{ExtensionPolicy, KindPolicy};
use crate::metadata::{DocumentMetadata, RootDescriptor};
use crate::recents::RecentsLedger;
use crate::search::{validate_query, SearchEngine};
use crate::streamer::{ContentStreamer, ReadableHandle};
use crate::tree::TreeQuery;
use crate::{Error, Result};

/// Document-tree view of an asset store.
///
/// Every operation takes and returns protocol-level values: identifiers as
/// strings in, metadata rows out. The bridge itself holds no mutable state;
/// the recents list lives in the preference store.
///
/// # Example
///
/// ```rust,ignore
/// let bridge = Bridge::builder(assets, prefs).config(config).build()?;
///
/// for child in bridge.list_children("")? {
///     println!("{} ({})", child.display_name, child.mime_type);
/// }
///
/// let mut handle = bridge.open_content("Cats/Grumpy Cat.jpg")?;
/// tokio::io::copy(&mut handle, &mut tokio::io::stdout()).await?;
/// ```
#[derive(Debug)]
pub struct Bridge {
    config: BridgeConfig,
    root: DocumentId,
    tree: TreeQuery,
    search: SearchEngine,
    recents: Arc<RecentsLedger>,
    streamer: ContentStreamer,
}

impl Bridge {
    /// Start building a bridge over `assets`, persisting into `prefs`.
    pub fn builder(
        assets: Arc<dyn AssetStore>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> BridgeBuilder {
        BridgeBuilder {
            assets,
            prefs,
            config: BridgeConfig::default(),
            policy: None,
            runtime: None,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Identifier of the root directory.
    pub fn root_document(&self) -> &DocumentId {
        &self.root
    }

    /// The recents ledger backing `list_recents`.
    pub fn recents(&self) -> &Arc<RecentsLedger> {
        &self.recents
    }

    /// The roots this bridge exposes. There is always exactly one.
    pub fn list_roots(&self) -> Vec<RootDescriptor> {
        log::debug!("list_roots");
        vec![RootDescriptor {
            root_id: self.config.root_id.clone(),
            title: self.config.title.clone(),
            supports_recents: true,
            supports_search: true,
            local_only: true,
            accepted_mime_types: self.config.accepted_mime_types.clone(),
            document_id: self.root.clone(),
        }]
    }

    /// Metadata for one document.
    pub fn get_document(&self, id: &str) -> Result<DocumentMetadata> {
        log::debug!("get_document {}", id);
        let id = self.scoped(id)?;
        self.tree.get_metadata(&id)
    }

    /// Metadata for every child of a directory.
    pub fn list_children(&self, parent_id: &str) -> Result<Vec<DocumentMetadata>> {
        log::debug!("list_children {}", parent_id);
        let parent = self.scoped(parent_id)?;
        self.tree.list_children(&parent)
    }

    /// Open a document for streaming; records it as recently opened.
    pub fn open_content(&self, id: &str) -> Result<ReadableHandle> {
        log::debug!("open_content {}", id);
        let id = self.scoped(id)?;
        self.streamer.open_content(&id)
    }

    /// Files under the root whose display name contains `query`.
    pub fn search(&self, root_id: &str, query: &str) -> Result<Vec<DocumentMetadata>> {
        log::debug!("search {}, {}", root_id, query);
        validate_query(query)?;
        self.check_root(root_id)?;
        self.search.search(&self.root, query)
    }

    /// Recently opened documents that still exist, most recent first.
    pub fn list_recents(&self, root_id: &str) -> Result<Vec<DocumentMetadata>> {
        log::debug!("list_recents {}", root_id);
        self.check_root(root_id)?;
        let ids = match self.recents.list() {
            Ok(ids) => ids,
            Err(Error::Io(e)) => return Err(Error::from_query(root_id, e)),
            Err(e) => return Err(e),
        };
        Ok(self.tree.resolve_existing(&ids))
    }

    /// Parse `raw`, treating anything outside the root as absent.
    fn scoped(&self, raw: &str) -> Result<DocumentId> {
        let id = DocumentId::parse(raw)?;
        if id.is_within(&self.root) {
            Ok(id)
        } else {
            log::debug!("'{}' is outside root '{}'", id, self.root);
            Err(Error::not_found(raw))
        }
    }

    fn check_root(&self, root_id: &str) -> Result<()> {
        if root_id == self.config.root_id {
            Ok(())
        } else {
            Err(Error::not_found(root_id))
        }
    }
}

/// Builder for [`Bridge`].
pub struct BridgeBuilder {
    assets: Arc<dyn AssetStore>,
    prefs: Arc<dyn PreferenceStore>,
    config: BridgeConfig,
    policy: Option<Arc<dyn KindPolicy>>,
    runtime: Option<Handle>,
}

impl BridgeBuilder {
    #[must_use]
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `policy` to decide node kinds.
    #[must_use]
    pub fn policy(mut self, policy: Arc<dyn KindPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Run transfers on `runtime` instead of the current one.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn build(self) -> Result<Bridge> {
        let config = self.config.sanitized();
        let root = DocumentId::parse(&config.root_document_id)?;

        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| {
                Error::invalid_argument(format!("no tokio runtime to run transfers on: {}", e))
            })?,
        };

        let policy: Arc<dyn KindPolicy> = match (self.policy, config.kind_policy) {
            (Some(policy), _) => policy,
            (None, KindPolicyConfig::Extension) => Arc::new(ExtensionPolicy),
            (None, KindPolicyConfig::Indexed) => {
                log::warn!("Indexed kind policy configured but no index supplied; using extensions");
                Arc::new(ExtensionPolicy)
            }
        };

        let recents = Arc::new(RecentsLedger::new(
            self.prefs,
            config.recents_key.clone(),
            config.recents_capacity,
        ));

        let tree = TreeQuery::new(self.assets.clone(), policy, root.clone(), config.title.clone())
            .with_recents(recents.clone());
        let search = SearchEngine::new(tree.clone()).with_limit(config.search_limit);
        let streamer = ContentStreamer::new(self.assets, recents.clone(), runtime)
            .with_chunk_size(config.chunk_size)
            .with_pipe_depth(config.pipe_depth);

        log::debug!(
            "Bridge ready: root '{}' at '{}', recents under '{}'",
            config.root_id,
            root,
            config.recents_key
        );

        Ok(Bridge {
            config,
            root,
            tree,
            search,
            recents,
            streamer,
        })
    }
}
