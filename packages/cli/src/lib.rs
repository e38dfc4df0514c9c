//! # assetfs-cli
//!
//! A command-line protocol adapter for `assetfs-bridge`: browse, search and
//! read a directory of bundled assets as a document tree.
//!
//! ## Usage
//!
//! ```bash
//! assetfs --assets ./memes roots
//! assetfs --assets ./memes ls Cats
//! assetfs --assets ./memes search cat
//! assetfs --assets ./memes cat "Cats/Grumpy Cat.jpg" -o grumpy.jpg
//! assetfs --assets ./memes --json recents
//! ```
//!
//! Configuration is read from `<config dir>/assetfs/config.toml` when
//! present; recents persist to `<data dir>/assetfs/prefs.json` unless
//! `--prefs` says otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use assetfs_bridge::{Bridge, IndexedPolicy, KindPolicyConfig};
use assetfs_store::{JsonFilePreferences, LocalAssetStore};

pub mod commands;
pub mod error;
pub mod render;
pub mod settings;

pub use commands::{Command, Output};
pub use error::{CliError, Result};

/// Where the CLI finds its inputs.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Directory holding the assets.
    pub assets: PathBuf,
    /// Preferences file; the platform default when `None`.
    pub prefs: Option<PathBuf>,
    /// Config file; the platform default when `None`.
    pub config: Option<PathBuf>,
    /// Emit JSON rows instead of a table.
    pub json: bool,
}

/// Build a bridge from `options`, run `command` and render the result.
pub async fn run(options: &Options, command: Command) -> Result<String> {
    let bridge = open_bridge(options)?;
    let output = commands::execute(&bridge, command).await?;
    render::render(&output, options.json)
}

/// Build the bridge described by `options`.
pub fn open_bridge(options: &Options) -> Result<Bridge> {
    let config = settings::load_config(options.config.as_deref())?;
    let assets = LocalAssetStore::new(&options.assets)?;

    let prefs_path = match &options.prefs {
        Some(path) => path.clone(),
        None => settings::default_prefs_path().ok_or(CliError::NoPrefsLocation)?,
    };
    let prefs = JsonFilePreferences::new(prefs_path)?;

    let mut builder = Bridge::builder(Arc::new(assets.clone()), Arc::new(prefs));
    if config.kind_policy == KindPolicyConfig::Indexed {
        let index = IndexedPolicy::new(assets.file_index()?);
        log::debug!("Indexed {} files under {}", index.len(), assets.root().display());
        builder = builder.policy(Arc::new(index));
    }

    Ok(builder.config(config).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(dir: &tempfile::TempDir) -> Options {
        let assets = dir.path().join("assets");
        fs::create_dir_all(assets.join("Cats")).unwrap();
        fs::write(assets.join("Cats/Grumpy Cat.jpg"), b"meow").unwrap();
        fs::write(assets.join("Cats/README"), b"docs").unwrap();

        let config = dir.path().join("config.toml");
        fs::write(&config, "root_id = \"Memes\"\nkind_policy = \"indexed\"\n").unwrap();

        Options {
            assets,
            prefs: Some(dir.path().join("state/prefs.json")),
            config: Some(config),
            json: true,
        }
    }

    #[tokio::test]
    async fn indexed_config_classifies_readme() {
        let dir = tempfile::tempdir().unwrap();
        let text = run(
            &options(&dir),
            Command::Doc {
                id: "Cats/README".to_string(),
            },
        )
        .await
        .unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["kind"], "file");
    }

    #[tokio::test]
    async fn missing_assets_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(&dir);
        options.assets = dir.path().join("nowhere");
        assert!(matches!(
            run(&options, Command::Roots).await,
            Err(CliError::Store(_))
        ));
    }
}
