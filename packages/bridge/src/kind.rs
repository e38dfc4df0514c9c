//! Directory/file inference.
//!
//! The asset store exposes no directory markers, so the kind of a node is
//! decided from its identifier alone. Every component asks a [`KindPolicy`]
//! rather than inspecting identifiers itself, which keeps the decision in a
//! single place and consistent across queries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document_id::{has_extension, last_segment};

/// Kind of a node in the inferred tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    pub fn is_directory(self) -> bool {
        self == NodeKind::Directory
    }

    pub fn is_file(self) -> bool {
        self == NodeKind::File
    }
}

/// Decides whether an identifier names a directory or a file.
///
/// Implementations must be pure: the same identifier always yields the same
/// kind for the lifetime of the policy.
pub trait KindPolicy: Send + Sync {
    fn kind_of(&self, id: &str) -> NodeKind;
}

/// The canonical heuristic: a node is a file iff its final segment
/// contains a `.`.
///
/// Extension-less files (`README`) read as directories and dotted
/// directory names (`v1.2`) read as files under this rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionPolicy;

impl KindPolicy for ExtensionPolicy {
    fn kind_of(&self, id: &str) -> NodeKind {
        if has_extension(last_segment(id)) {
            NodeKind::File
        } else {
            NodeKind::Directory
        }
    }
}

/// A side index of known file identifiers.
///
/// Identifiers in the index are files and identifiers that are a strict
/// prefix of an indexed file are directories, whatever their names look
/// like. Anything else falls back to [`ExtensionPolicy`].
#[derive(Debug, Clone, Default)]
pub struct IndexedPolicy {
    files: HashSet<String>,
    directories: HashSet<String>,
}

impl IndexedPolicy {
    /// Build an index from the asset paths of every file.
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: HashSet<String> = files
            .into_iter()
            .map(|f| f.into().trim_matches('/').to_string())
            .filter(|f| !f.is_empty())
            .collect();

        let mut directories = HashSet::new();
        for file in &files {
            let mut end = file.len();
            while let Some(idx) = file[..end].rfind('/') {
                if !directories.insert(file[..idx].to_string()) {
                    break;
                }
                end = idx;
            }
        }

        Self { files, directories }
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl KindPolicy for IndexedPolicy {
    fn kind_of(&self, id: &str) -> NodeKind {
        let id = id.trim_matches('/');
        if self.files.contains(id) {
            NodeKind::File
        } else if id.is_empty() || self.directories.contains(id) {
            NodeKind::Directory
        } else {
            ExtensionPolicy.kind_of(id)
        }
    }
}

impl<T: KindPolicy + ?Sized> KindPolicy for std::sync::Arc<T> {
    fn kind_of(&self, id: &str) -> NodeKind {
        self.as_ref().kind_of(id)
    }
}

impl<T: KindPolicy + ?Sized> KindPolicy for Box<T> {
    fn kind_of(&self, id: &str) -> NodeKind {
        self.as_ref().kind_of(id)
    }
}
