//! Error types for the bridge.

use assetfs_store::StoreError;

use crate::streamer::TransferId;

/// Errors surfaced by bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The identifier does not resolve to anything in the asset store.
    #[error("document not found: {id}")]
    NotFound { id: String },

    /// The caller supplied a malformed identifier or query.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The asset store or the preference store failed.
    #[error("io failure: {0}")]
    Io(#[from] StoreError),

    /// A background transfer stopped before delivering every byte.
    ///
    /// Never returned from `open_content`; only observed by the consumer
    /// reading the handle.
    #[error("transfer {transfer} of '{id}' interrupted: {message}")]
    TransferInterrupted {
        transfer: TransferId,
        id: String,
        message: String,
    },
}

impl Error {
    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Map a store failure on a query path to `NotFound`, logging the cause.
    ///
    /// Queries have no separate retry contract upstream, so both a missing
    /// path and a storage fault read as "no such document".
    pub(crate) fn from_query(id: &str, err: StoreError) -> Self {
        if err.is_missing() {
            log::debug!("Lookup of '{}' failed: {}", id, err);
        } else {
            log::warn!("Store failure while resolving '{}': {}", id, err);
        }
        Error::not_found(id)
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
