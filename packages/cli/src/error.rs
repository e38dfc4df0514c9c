//! Error types for the command-line front end.

use std::io;
use std::path::PathBuf;

use assetfs_store::StoreError;

/// Errors surfaced by `assetfs` commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Bridge(#[from] assetfs_bridge::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No platform data directory and no `--prefs` given.
    #[error("no location for the preferences file; pass --prefs")]
    NoPrefsLocation,

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_read_display() {
        let e = CliError::ConfigRead {
            path: PathBuf::from("/etc/assetfs.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            e.to_string(),
            "cannot read config file /etc/assetfs.toml: denied"
        );
    }
}
