//! Sink handle
//!
//! `SinkHandle` wraps a processor's channel sender and its diagnostic name,
//! so the router can fan batches out without knowing what consumes them.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use crate::batch::Batches;
use crate::BatchesSender;

/// Handle to one registered processor channel
///
/// The name exists for diagnostics only: it appears in drop logs when the
/// sink falls behind.
pub struct SinkHandle {
    name: String,
    sender: BatchesSender,
}

impl SinkHandle {
    pub(crate) fn new(name: impl Into<String>, sender: BatchesSender) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }

    /// The sink's diagnostic name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Try to deliver a batch without blocking
    ///
    /// A full channel is the signal to drop: the router never waits on a
    /// sink.
    #[inline]
    pub fn try_send(&self, batches: Arc<Batches>) -> Result<(), TrySendError<Arc<Batches>>> {
        self.sender.try_send(batches)
    }

    /// True when the processor dropped its receiver
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining capacity of the sink channel
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Maximum capacity of the sink channel
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

impl std::fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkHandle")
            .field("name", &self.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}
