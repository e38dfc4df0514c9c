//! Error types for the store layer.
//!
//! Errors at this level describe what the backing storage reported. They
//! carry no document-tree semantics; the bridge decides how each one is
//! surfaced to its callers.

use std::path::PathBuf;

/// Errors reported by asset stores and preference stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing exists at the given asset path.
    #[error("no asset at path: {path}")]
    NotFound { path: String },

    /// The path exists but cannot be listed.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// The path exists but cannot be opened for reading.
    #[error("not a file: {path}")]
    NotAFile { path: String },

    /// The path is malformed or escapes the store root.
    #[error("invalid asset path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// The root directory of a local store could not be used.
    #[error("invalid store root {}: {source}", path.display())]
    RootPathInvalid {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted preference file did not hold a JSON object of strings.
    #[error("corrupt preference file {}: {message}", path.display())]
    CorruptPreferences { path: PathBuf, message: String },

    /// Generic I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn invalid_path(path: &str, message: impl Into<String>) -> Self {
        StoreError::InvalidPath {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error means "nothing usable at this path" rather than a
    /// failure of the storage itself.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. }
                | StoreError::NotADirectory { .. }
                | StoreError::NotAFile { .. }
        )
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
