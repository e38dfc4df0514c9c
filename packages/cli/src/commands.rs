//! Subcommands and their execution against a [`Bridge`].
//!
//! Commands:
//! - `roots` - List the advertised roots
//! - `doc <id>` - Show one document
//! - `ls [id]` - List a directory, the root by default
//! - `cat <id> [-o file]` - Stream a document's bytes
//! - `search <query>` - Find files by display name
//! - `recents` - List recently opened documents

use std::path::PathBuf;

use assetfs_bridge::{Bridge, DocumentMetadata, RootDescriptor, TransferState};
use clap::Subcommand;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the roots
    Roots,

    /// Show metadata for one document
    Doc {
        /// Document identifier
        id: String,
    },

    /// List the children of a directory
    Ls {
        /// Directory identifier; the root when omitted
        id: Option<String>,
    },

    /// Write a document's content to stdout or a file
    Cat {
        /// Document identifier
        id: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search file names under a root
    Search {
        /// Case-insensitive substring of the display name
        query: String,

        /// Root to search; the configured root when omitted
        #[arg(long)]
        root: Option<String>,
    },

    /// List recently opened documents
    Recents {
        /// Root to list; the configured root when omitted
        #[arg(long)]
        root: Option<String>,
    },
}

/// What a command produced.
#[derive(Debug)]
pub enum Output {
    Roots(Vec<RootDescriptor>),
    Document(DocumentMetadata),
    Documents(Vec<DocumentMetadata>),
    /// Content was streamed; `path` is `None` for stdout.
    Streamed {
        id: String,
        bytes: u64,
        path: Option<PathBuf>,
    },
}

/// Run `command` against `bridge`.
pub async fn execute(bridge: &Bridge, command: Command) -> Result<Output> {
    let root_id = || bridge.config().root_id.clone();

    match command {
        Command::Roots => Ok(Output::Roots(bridge.list_roots())),
        Command::Doc { id } => Ok(Output::Document(bridge.get_document(&id)?)),
        Command::Ls { id } => {
            let id = id.unwrap_or_else(|| bridge.root_document().to_string());
            Ok(Output::Documents(bridge.list_children(&id)?))
        }
        Command::Cat { id, output } => {
            let bytes = stream(bridge, &id, output.as_ref()).await?;
            Ok(Output::Streamed {
                id,
                bytes,
                path: output,
            })
        }
        Command::Search { query, root } => {
            let root = root.unwrap_or_else(root_id);
            Ok(Output::Documents(bridge.search(&root, &query)?))
        }
        Command::Recents { root } => {
            let root = root.unwrap_or_else(root_id);
            Ok(Output::Documents(bridge.list_recents(&root)?))
        }
    }
}

async fn stream(bridge: &Bridge, id: &str, output: Option<&PathBuf>) -> Result<u64> {
    let mut handle = bridge.open_content(id)?;
    let mut status = handle.status();

    let bytes = match output {
        Some(path) => {
            let mut file = tokio::fs::File::create(path).await?;
            let n = tokio::io::copy(&mut handle, &mut file).await?;
            file.flush().await?;
            n
        }
        None => {
            let mut stdout = tokio::io::stdout();
            let n = tokio::io::copy(&mut handle, &mut stdout).await?;
            stdout.flush().await?;
            n
        }
    };

    let state = status.finished().await;
    log::debug!("Transfer {} of '{}' ended {:?}", status.transfer_id(), id, state);
    if state != TransferState::Completed {
        log::warn!("Transfer of '{}' ended early after {} bytes", id, bytes);
    }
    Ok(bytes)
}
