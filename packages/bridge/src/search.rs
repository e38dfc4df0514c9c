//! Name search over the inferred tree.

use std::collections::VecDeque;

use crate::document_id::{display_name_as, DocumentId};
use crate::metadata::DocumentMetadata;
use crate::tree::TreeQuery;
use crate::{Error, Result};

/// Breadth-first, case-insensitive substring search on display names.
///
/// Results are files only, in the order they were found. Within one level
/// the order follows the store's listing order; stores that do not specify
/// a listing order make the order across sibling subtrees unspecified too.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    tree: TreeQuery,
    limit: Option<usize>,
}

impl SearchEngine {
    pub fn new(tree: TreeQuery) -> Self {
        Self { tree, limit: None }
    }

    /// Stop after `limit` matches.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Files at or below `root` whose display name contains `query`,
    /// ignoring case.
    ///
    /// A subtree that cannot be listed is logged and skipped. Only a failure
    /// to list `root` itself is an error.
    pub fn search(&self, root: &DocumentId, query: &str) -> Result<Vec<DocumentMetadata>> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        if self.limit == Some(0) {
            return Ok(results);
        }

        let mut pending: VecDeque<DocumentId> = VecDeque::new();
        pending.push_back(root.clone());
        let mut visited = 0usize;

        while let Some(id) = pending.pop_front() {
            visited += 1;

            let kind = self.tree.kind_of(&id);
            if kind.is_directory() {
                match self.tree.child_ids(&id) {
                    Ok(children) => pending.extend(children),
                    Err(e) if id == *root => return Err(e),
                    Err(e) => log::warn!("Search skipping subtree '{}': {}", id, e),
                }
                continue;
            }

            // Match on the name alone; full metadata reads preferences.
            let matched = match display_name_as(id.as_str(), kind) {
                Ok(name) => name.to_lowercase().contains(&needle),
                Err(e) => {
                    log::warn!("Search skipping '{}': {}", id, e);
                    false
                }
            };
            if !matched {
                continue;
            }

            match self.tree.describe(&id) {
                Ok(meta) => results.push(meta),
                Err(e) => {
                    log::warn!("Search skipping '{}': {}", id, e);
                    continue;
                }
            }
            if self.limit.is_some_and(|limit| results.len() >= limit) {
                log::debug!("Search for '{}' hit its limit of {}", query, results.len());
                break;
            }
        }

        log::debug!(
            "Search for '{}' under '{}' visited {} nodes, found {}",
            query,
            root,
            visited,
            results.len()
        );
        Ok(results)
    }
}

impl From<TreeQuery> for SearchEngine {
    fn from(tree: TreeQuery) -> Self {
        SearchEngine::new(tree)
    }
}

/// Reject queries that cannot match meaningfully.
pub(crate) fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::invalid_argument("search query must not be empty"));
    }
    Ok(())
}
