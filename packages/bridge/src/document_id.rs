//! Document identifiers and the path arithmetic over them.
//!
//! A document identifier is the slash-delimited asset path of a node,
//! relative to the asset store root. The empty identifier names the store
//! root itself. Nothing in an identifier marks it as a directory; see
//! [`crate::kind`] for how kinds are inferred.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::{ExtensionPolicy, KindPolicy, NodeKind};
use crate::{Error, Result};

/// Path separator between identifier segments.
pub const SEPARATOR: char = '/';

/// Separator between a file's base name and its extension.
pub const EXTENSION_SEPARATOR: char = '.';

/// A normalized document identifier.
///
/// Identifiers are compared and hashed by their normalized string form, so
/// the same underlying asset path always yields the same identifier.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Parse an identifier string.
    ///
    /// Empty segments are dropped, which normalizes `//`, leading and
    /// trailing separators. `.` and `..` segments are rejected so that
    /// identifiers always name a node of a strict tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use assetfs_bridge::DocumentId;
    ///
    /// let id = DocumentId::parse("Cats/Grumpy Cat.jpg").unwrap();
    /// assert_eq!(id.name(), "Grumpy Cat.jpg");
    ///
    /// assert_eq!(DocumentId::parse("/Cats/").unwrap(), DocumentId::parse("Cats").unwrap());
    /// assert!(DocumentId::parse("Cats/../Dogs").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let mut normalized = String::with_capacity(s.len());
        for segment in s.split(SEPARATOR).filter(|seg| !seg.is_empty()) {
            validate_segment(segment)?;
            if !normalized.is_empty() {
                normalized.push(SEPARATOR);
            }
            normalized.push_str(segment);
        }
        Ok(DocumentId(normalized))
    }

    /// The identifier of the asset store root.
    pub fn store_root() -> Self {
        DocumentId(String::new())
    }

    /// Whether this is the asset store root.
    pub fn is_store_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The identifier as a string slice, usable as an asset path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final segment, or the empty string for the store root.
    pub fn name(&self) -> &str {
        last_segment(&self.0)
    }

    /// Iterate over the segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|seg| !seg.is_empty())
    }

    /// Number of segments; zero for the store root.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The parent identifier, or `None` for the store root.
    pub fn parent(&self) -> Option<DocumentId> {
        if self.is_store_root() {
            return None;
        }
        Some(match self.0.rfind(SEPARATOR) {
            Some(idx) => DocumentId(self.0[..idx].to_string()),
            None => DocumentId::store_root(),
        })
    }

    /// Whether this identifier is `ancestor` or lies beneath it.
    ///
    /// Every identifier is within the store root.
    pub fn is_within(&self, ancestor: &DocumentId) -> bool {
        if ancestor.is_store_root() {
            return true;
        }
        match self.0.strip_prefix(ancestor.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// Identifier of the child named `segment` under this one.
    pub fn child(&self, segment: &str) -> Result<DocumentId> {
        child_id(self.as_str(), segment)
    }

    /// Whether the canonical heuristic classifies this as a directory.
    pub fn is_directory(&self) -> bool {
        is_directory(self.as_str())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DocumentId::parse(s)
    }
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::invalid_argument("empty path segment"));
    }
    if segment == "." || segment == ".." {
        return Err(Error::invalid_argument(format!(
            "relative segment '{}' is not allowed",
            segment
        )));
    }
    if segment.contains(SEPARATOR) {
        return Err(Error::invalid_argument(format!(
            "segment '{}' contains a path separator",
            segment
        )));
    }
    Ok(())
}

/// The final segment of a raw identifier.
pub fn last_segment(id: &str) -> &str {
    let trimmed = id.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Whether a segment carries an extension separator.
pub fn has_extension(segment: &str) -> bool {
    segment.contains(EXTENSION_SEPARATOR)
}

/// A segment with its extension suffix removed.
///
/// The suffix starts at the last `.`; a segment whose only `.` is its first
/// character (a dotfile) is returned unchanged.
pub fn strip_extension(segment: &str) -> &str {
    match segment.rfind(EXTENSION_SEPARATOR) {
        Some(idx) if idx > 0 => &segment[..idx],
        _ => segment,
    }
}

/// The extension of a segment, without the leading `.`.
pub fn extension(segment: &str) -> Option<&str> {
    match segment.rfind(EXTENSION_SEPARATOR) {
        Some(idx) if idx > 0 => Some(&segment[idx + 1..]),
        _ => None,
    }
}

/// Whether `id` is a directory under the canonical extension heuristic.
pub fn is_directory(id: &str) -> bool {
    ExtensionPolicy.kind_of(id) == NodeKind::Directory
}

/// Display name of `id` under the canonical extension heuristic.
///
/// Directories keep their final segment unchanged; files lose their
/// extension suffix.
pub fn display_name(id: &str) -> Result<String> {
    display_name_as(id, ExtensionPolicy.kind_of(id))
}

/// Display name of `id` for an already decided kind.
pub fn display_name_as(id: &str, kind: NodeKind) -> Result<String> {
    let segment = last_segment(id);
    if segment.is_empty() {
        return Err(Error::invalid_argument(
            "identifier is empty where a document name is required",
        ));
    }
    Ok(match kind {
        NodeKind::Directory => segment.to_string(),
        NodeKind::File => strip_extension(segment).to_string(),
    })
}

/// Join a parent identifier and a child segment.
///
/// The inverse of splitting: `last_segment(child_id(p, s)) == s` for every
/// valid segment `s`.
pub fn child_id(parent: &str, segment: &str) -> Result<DocumentId> {
    validate_segment(segment)?;
    let parent = parent.trim_matches(SEPARATOR);
    if parent.is_empty() {
        Ok(DocumentId(segment.to_string()))
    } else {
        Ok(DocumentId(format!("{}{}{}", parent, SEPARATOR, segment)))
    }
}
