//! Channel-bridging reader
//!
//! Forwards entries produced outside the pipeline onto the shared input.
//! Hosts with custom watch machinery build entries themselves and hand this
//! reader the receiving half; the integration tests drive the pipeline the
//! same way.

use async_trait::async_trait;
use tracing::debug;

use crier_pipeline::{BoxError, EntryReceiver, EntrySender, Reader};

use crate::error::ReaderError;

/// Reader that forwards an external entry stream to the shared input
///
/// The forwarding task ends when the source stream closes; the shared
/// input stays open for other readers.
pub struct ChannelReader {
    source: Option<EntryReceiver>,
    out: Option<EntrySender>,
    started: bool,
}

impl ChannelReader {
    pub fn new(source: EntryReceiver) -> Self {
        Self {
            source: Some(source),
            out: None,
            started: false,
        }
    }
}

#[async_trait]
impl Reader for ChannelReader {
    fn set_out(&mut self, out: EntrySender) -> Result<(), BoxError> {
        if self.started {
            return Err(ReaderError::SetOutAfterRun.into());
        }
        self.out = Some(out);
        Ok(())
    }

    async fn run(&mut self) -> Result<(), BoxError> {
        if self.started {
            return Err(ReaderError::AlreadyStarted.into());
        }
        let Some(out) = self.out.clone() else {
            return Err(ReaderError::NoOutput.into());
        };
        let Some(mut source) = self.source.take() else {
            return Err(ReaderError::AlreadyStarted.into());
        };
        self.started = true;

        tokio::spawn(async move {
            while let Some(entry) = source.recv().await {
                if out.send(entry).await.is_err() {
                    break;
                }
            }
            debug!("channel reader source closed");
        });
        Ok(())
    }
}

impl std::fmt::Debug for ChannelReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelReader")
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
#[path = "channel_test.rs"]
mod tests;
