//! Locating and loading the bridge configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use assetfs_bridge::BridgeConfig;

use crate::error::{CliError, Result};

/// `<config dir>/assetfs/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("assetfs").join("config.toml"))
}

/// `<data dir>/assetfs/prefs.json`, if the platform has a data dir.
pub fn default_prefs_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("assetfs").join("prefs.json"))
}

/// Load the configuration.
///
/// An explicit `path` must exist. The default location is optional: if
/// nothing is there, defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(BridgeConfig::default()),
        },
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(BridgeConfig::default());
        }
        Err(source) => return Err(CliError::ConfigRead { path, source }),
    };

    let config = parse_config(&text).map_err(|source| CliError::ConfigParse {
        path: path.clone(),
        source,
    })?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse a TOML configuration; omitted keys take their defaults.
pub fn parse_config(text: &str) -> std::result::Result<BridgeConfig, toml::de::Error> {
    toml::from_str(text)
}
