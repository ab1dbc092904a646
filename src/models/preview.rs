//! Streaming preview delivery.
//!
//! Models push partial chunks through a [`PreviewSink`] while they run.
//! Delivery is best effort: a full or closed channel drops the chunk and
//! never fails the generation.

use tokio::sync::mpsc;
use tracing::trace;

use crate::types::AudioChunk;

/// Best-effort sender for live preview chunks.
#[derive(Debug, Clone, Default)]
pub struct PreviewSink {
    sender: Option<mpsc::Sender<AudioChunk>>,
}

impl PreviewSink {
    /// Creates a sink delivering into `sender`.
    pub fn new(sender: mpsc::Sender<AudioChunk>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Creates a sink that discards every chunk.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Returns true if chunks are delivered anywhere.
    pub fn is_enabled(&self) -> bool {
        self.sender.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Delivers a chunk without waiting.
    ///
    /// Returns true if the chunk was queued.
    pub fn send(&self, chunk: AudioChunk) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };

        match sender.try_send(chunk) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(chunk)) => {
                trace!("Preview channel full, dropping chunk {}", chunk.index);
                false
            }
            Err(mpsc::error::TrySendError::Closed(chunk)) => {
                trace!("Preview channel closed, dropping chunk {}", chunk.index);
                false
            }
        }
    }
}
