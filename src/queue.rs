//! Bounded hand-off between the capture loop and the recognition loop.
//!
//! A fixed-capacity crossbeam channel with a drop-newest overflow policy:
//! when the recognizer falls behind, the freshest chunk is discarded so the
//! audio already queued keeps its continuity.

use crate::audio::AudioChunk;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Producer side of the chunk queue, owned by the capture loop.
#[derive(Clone)]
pub struct ChunkSender {
    tx: Sender<AudioChunk>,
}

/// Consumer side of the chunk queue, owned by the recognition loop.
pub struct ChunkReceiver {
    rx: Receiver<AudioChunk>,
}

/// Creates a chunk queue with the given fixed capacity.
pub fn chunk_queue(capacity: usize) -> (ChunkSender, ChunkReceiver) {
    let (tx, rx) = bounded(capacity);
    (ChunkSender { tx }, ChunkReceiver { rx })
}

impl ChunkSender {
    /// Non-blocking push. Returns `false` and drops `chunk` when the queue
    /// is at capacity (or the consumer side is gone).
    pub fn try_push(&self, chunk: AudioChunk) -> bool {
        self.tx.try_send(chunk).is_ok()
    }

    /// Number of chunks currently queued.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

impl ChunkReceiver {
    /// Blocks up to `timeout` for the next chunk.
    ///
    /// `None` on timeout lets the consumer re-check its cancellation flag
    /// without busy-waiting or blocking indefinitely. `None` is also
    /// returned once all senders are gone and the queue is drained.
    pub fn pop(&self, timeout: Duration) -> Option<AudioChunk> {
        match self.rx.recv_timeout(timeout) {
            Ok(chunk) => Some(chunk),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
