//! Bridge configuration.

use serde::{Deserialize, Serialize};

/// Default number of entries kept in the recents list.
pub const DEFAULT_RECENTS_CAPACITY: usize = 64;

/// Default size of one transfer chunk, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default number of chunks buffered between a transfer and its reader.
pub const DEFAULT_PIPE_DEPTH: usize = 16;

/// How node kinds are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindPolicyConfig {
    /// A final segment containing `.` is a file.
    #[default]
    Extension,
    /// Consult an index of known files first, when the store can build one.
    Indexed,
}

/// Configuration for a [`crate::Bridge`].
///
/// Every field has a default, so a partial TOML table is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Identifier of the single root advertised to the protocol adapter.
    pub root_id: String,

    /// Human-readable title of the root.
    pub title: String,

    /// Document identifier of the root directory, as an asset path.
    ///
    /// Empty means the asset store root.
    pub root_document_id: String,

    /// MIME type filters advertised by the root.
    pub accepted_mime_types: Vec<String>,

    /// Preference key holding the recents list.
    pub recents_key: String,

    /// Maximum number of recents entries.
    pub recents_capacity: usize,

    /// Bytes copied per transfer chunk.
    pub chunk_size: usize,

    /// Chunks buffered between a transfer and its reader.
    pub pipe_depth: usize,

    /// Stop a search after this many matches.
    pub search_limit: Option<usize>,

    /// Kind inference policy.
    pub kind_policy: KindPolicyConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            root_id: "assets".to_string(),
            title: "Assets".to_string(),
            root_document_id: String::new(),
            accepted_mime_types: vec!["image/*".to_string()],
            recents_key: "recents".to_string(),
            recents_capacity: DEFAULT_RECENTS_CAPACITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            pipe_depth: DEFAULT_PIPE_DEPTH,
            search_limit: None,
            kind_policy: KindPolicyConfig::Extension,
        }
    }
}

impl BridgeConfig {
    /// Clamp values that would make the bridge unusable.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.recents_capacity == 0 {
            log::warn!("recents_capacity of 0 raised to 1");
            self.recents_capacity = 1;
        }
        if self.chunk_size == 0 {
            log::warn!("chunk_size of 0 reset to {}", DEFAULT_CHUNK_SIZE);
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.pipe_depth == 0 {
            self.pipe_depth = 1;
        }
        if self.recents_key.is_empty() {
            self.recents_key = BridgeConfig::default().recents_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.recents_capacity, 64);
        assert_eq!(config.accepted_mime_types, vec!["image/*"]);
        assert_eq!(config.kind_policy, KindPolicyConfig::Extension);
        assert!(config.root_document_id.is_empty());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"title": "Memes", "kind_policy": "indexed"}"#).unwrap();
        assert_eq!(config.title, "Memes");
        assert_eq!(config.kind_policy, KindPolicyConfig::Indexed);
        assert_eq!(config.recents_key, "recents");
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn sanitized_fixes_zeroes() {
        let config = BridgeConfig {
            recents_capacity: 0,
            chunk_size: 0,
            pipe_depth: 0,
            recents_key: String::new(),
            ..BridgeConfig::default()
        }
        .sanitized();
        assert_eq!(config.recents_capacity, 1);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.pipe_depth, 1);
        assert_eq!(config.recents_key, "recents");
    }
}
