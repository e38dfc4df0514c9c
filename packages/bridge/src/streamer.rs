//! Non-blocking delivery of document content.
//!
//! `open_content` opens the asset, hands the read end of a bounded pipe back
//! to the caller at once, and leaves a background transfer to fill the pipe
//! chunk by chunk. The pipe is a bounded tokio channel of byte chunks, so a
//! slow reader stalls only its own transfer. Dropping the read end makes the
//! transfer's next send fail, which stops it and releases the source.

use std::cmp;
use std::fmt;
use std::io::{self, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use assetfs_store::{AssetStore, AssetStream};
use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::config::{DEFAULT_CHUNK_SIZE, DEFAULT_PIPE_DEPTH};
use crate::document_id::DocumentId;
use crate::recents::RecentsLedger;
use crate::{Error, Result};

/// Names one background copy in logs and in interruption errors.
///
/// Every `open_content` call gets a fresh id, so two reads of the same
/// document can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an id read back from a log line or an error.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a background transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Bytes are still being copied.
    Running,
    /// Every byte of the source reached the pipe.
    Completed,
    /// The source failed or the reader went away first.
    Interrupted,
}

type Chunk = io::Result<Bytes>;

/// Opens documents and streams their bytes through a pipe.
pub struct ContentStreamer {
    assets: Arc<dyn AssetStore>,
    recents: Arc<RecentsLedger>,
    runtime: Handle,
    chunk_size: usize,
    pipe_depth: usize,
}

impl ContentStreamer {
    /// Create a streamer that runs transfers on `runtime`'s blocking pool.
    pub fn new(assets: Arc<dyn AssetStore>, recents: Arc<RecentsLedger>, runtime: Handle) -> Self {
        Self {
            assets,
            recents,
            runtime,
            chunk_size: DEFAULT_CHUNK_SIZE,
            pipe_depth: DEFAULT_PIPE_DEPTH,
        }
    }

    /// Bytes copied per chunk.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Chunks buffered between the transfer and the reader.
    #[must_use]
    pub fn with_pipe_depth(mut self, pipe_depth: usize) -> Self {
        self.pipe_depth = pipe_depth.max(1);
        self
    }

    /// Open `id` and start streaming it.
    ///
    /// Fails with `NotFound` before any handle exists if the asset cannot be
    /// opened. Once a handle is returned, transfer failures only show up to
    /// whoever reads it. Each successful call records one access in the
    /// recents ledger; a ledger failure is logged and does not fail the
    /// open.
    pub fn open_content(&self, id: &DocumentId) -> Result<ReadableHandle> {
        let source = self
            .assets
            .open(id.as_str())
            .map_err(|e| Error::from_query(id.as_str(), e))?;

        let (tx, rx) = mpsc::channel(self.pipe_depth);
        let (state_tx, state_rx) = watch::channel(TransferState::Running);
        let transfer = Transfer {
            id: TransferId::new(),
            document: id.clone(),
            source,
            tx,
            state: state_tx,
            chunk_size: self.chunk_size,
        };
        let handle = ReadableHandle::new(transfer.id, id.clone(), rx, state_rx);

        log::debug!("Transfer {} of '{}' scheduled", transfer.id, id);
        self.runtime.spawn_blocking(move || transfer.run());

        if let Err(e) = self.recents.record_access(id) {
            log::warn!("Failed to record access to '{}': {}", id, e);
        }

        Ok(handle)
    }
}

impl fmt::Debug for ContentStreamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStreamer")
            .field("chunk_size", &self.chunk_size)
            .field("pipe_depth", &self.pipe_depth)
            .finish_non_exhaustive()
    }
}

/// Why a copy loop ended early.
enum Stop {
    ReaderClosed,
    SourceFailed(io::Error),
}

/// One background copy from an asset stream into a pipe.
struct Transfer {
    id: TransferId,
    document: DocumentId,
    source: AssetStream,
    tx: mpsc::Sender<Chunk>,
    state: watch::Sender<TransferState>,
    chunk_size: usize,
}

impl Transfer {
    fn run(mut self) {
        match self.copy() {
            Ok(total) => {
                log::debug!(
                    "Transfer {} of '{}' completed, {} bytes",
                    self.id,
                    self.document,
                    total
                );
                self.state.send_replace(TransferState::Completed);
            }
            Err(Stop::ReaderClosed) => {
                log::debug!(
                    "Transfer {} of '{}' stopped, reader closed the pipe",
                    self.id,
                    self.document
                );
                self.state.send_replace(TransferState::Interrupted);
            }
            Err(Stop::SourceFailed(e)) => {
                log::error!(
                    "Transfer {} of '{}' failed: {}",
                    self.id,
                    self.document,
                    e
                );
                self.state.send_replace(TransferState::Interrupted);
                let interrupted = Error::TransferInterrupted {
                    transfer: self.id,
                    id: self.document.to_string(),
                    message: e.to_string(),
                };
                let _ = self.tx.blocking_send(Err(io::Error::new(e.kind(), interrupted)));
            }
        }
    }

    fn copy(&mut self) -> std::result::Result<u64, Stop> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut total = 0u64;
        loop {
            let n = match self.source.read(&mut buf) {
                Ok(0) => return Ok(total),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Stop::SourceFailed(e)),
            };
            self.tx
                .blocking_send(Ok(Bytes::copy_from_slice(&buf[..n])))
                .map_err(|_| Stop::ReaderClosed)?;
            total += n as u64;
        }
    }
}

impl Drop for Transfer {
    fn drop(&mut self) {
        // A panic in the copy loop must not leave watchers waiting forever.
        self.state.send_if_modified(|state| {
            if *state == TransferState::Running {
                *state = TransferState::Interrupted;
                true
            } else {
                false
            }
        });
    }
}

/// The read end of a content pipe.
///
/// Implements [`AsyncRead`] for use inside a runtime and [`Read`] for plain
/// threads. The blocking [`Read`] impl must not be used from within an
/// async context.
///
/// End of stream means the transfer finished or stopped; a source failure
/// surfaces as one `io::Error` wrapping [`Error::TransferInterrupted`].
pub struct ReadableHandle {
    transfer: TransferId,
    document: DocumentId,
    rx: mpsc::Receiver<Chunk>,
    pending: Bytes,
    state: watch::Receiver<TransferState>,
}

impl ReadableHandle {
    fn new(
        transfer: TransferId,
        document: DocumentId,
        rx: mpsc::Receiver<Chunk>,
        state: watch::Receiver<TransferState>,
    ) -> Self {
        Self {
            transfer,
            document,
            rx,
            pending: Bytes::new(),
            state,
        }
    }

    pub fn transfer_id(&self) -> TransferId {
        self.transfer
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document
    }

    /// Current state of the feeding transfer.
    pub fn state(&self) -> TransferState {
        *self.state.borrow()
    }

    /// A watcher that outlives the handle, for awaiting the outcome.
    pub fn status(&self) -> TransferStatus {
        TransferStatus {
            transfer: self.transfer,
            state: self.state.clone(),
        }
    }

    /// Receive the next chunk, or `None` at end of stream.
    pub async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        if !self.pending.is_empty() {
            return Some(Ok(std::mem::take(&mut self.pending)));
        }
        self.rx.recv().await
    }

    fn fill_from_pending(&mut self, out: &mut [u8]) -> usize {
        let n = cmp::min(out.len(), self.pending.len());
        out[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        n
    }
}

impl fmt::Debug for ReadableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadableHandle")
            .field("transfer", &self.transfer)
            .field("document", &self.document)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AsyncRead for ReadableHandle {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }
        loop {
            if !this.pending.is_empty() {
                let n = cmp::min(buf.remaining(), this.pending.len());
                buf.put_slice(&this.pending[..n]);
                this.pending.advance(n);
                return Poll::Ready(Ok(()));
            }
            match ready!(this.rx.poll_recv(cx)) {
                Some(Ok(chunk)) => this.pending = chunk,
                Some(Err(e)) => return Poll::Ready(Err(e)),
                None => return Poll::Ready(Ok(())),
            }
        }
    }
}

impl Read for ReadableHandle {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if !self.pending.is_empty() {
                return Ok(self.fill_from_pending(out));
            }
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => self.pending = chunk,
                Some(Err(e)) => return Err(e),
                None => return Ok(0),
            }
        }
    }
}

/// Observes the outcome of a transfer independently of its handle.
#[derive(Debug, Clone)]
pub struct TransferStatus {
    transfer: TransferId,
    state: watch::Receiver<TransferState>,
}

impl TransferStatus {
    pub fn transfer_id(&self) -> TransferId {
        self.transfer
    }

    pub fn current(&self) -> TransferState {
        *self.state.borrow()
    }

    /// Wait until the transfer is no longer running.
    pub async fn finished(&mut self) -> TransferState {
        let outcome = self
            .state
            .wait_for(|state| *state != TransferState::Running)
            .await
            .map(|state| *state);
        match outcome {
            Ok(state) => state,
            Err(_) => *self.state.borrow(),
        }
    }
}
