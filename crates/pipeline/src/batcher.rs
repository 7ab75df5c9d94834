//! Batcher - Time-window coalescing
//!
//! Converts the high-rate entry stream into one deduplicated snapshot per
//! window. Within a window the newest entry for a `(entry type, uid)` pair
//! wins; ordering between distinct uids is not preserved. Consumers receive
//! change-state, not an event stream: an Add followed by a Delete inside
//! one window collapses to the Delete.
//!
//! The loop handles two events:
//!
//! - **Entry received** — keyed into the current window, overwriting any
//!   earlier entry with the same uid. Entries without a uid are logged and
//!   dropped.
//! - **Tick** — every window duration: a non-empty current window is handed
//!   downstream and replaced with a fresh one from the pools. An empty
//!   window emits nothing.
//!
//! When the input closes the batcher exits and closes its output. A pending
//! non-empty window is discarded at that point; callers that need a final
//! flush must drain before closing the input.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use crier_model::Entry;

use crate::batch::Batches;
use crate::error::PipelineError;
use crate::metrics::BatcherMetrics;
use crate::pool::{BatchPools, Recycler};
use crate::EntryReceiver;

/// The time-window coalescing stage
///
/// # Example
///
/// ```ignore
/// let batcher = Batcher::new(Duration::from_secs(5))?;
/// let recycler = batcher.recycler();
/// tokio::spawn(batcher.run(entry_rx, batches_tx));
/// ```
#[derive(Debug)]
pub struct Batcher {
    window: Duration,
    pools: Arc<BatchPools>,
    metrics: Arc<BatcherMetrics>,
    current: Batches,
}

impl Batcher {
    /// Create a batcher emitting once per `window`
    pub fn new(window: Duration) -> Result<Self, PipelineError> {
        if window.is_zero() {
            return Err(PipelineError::ZeroWindow);
        }

        let pools = Arc::new(BatchPools::new());
        let current = pools.get_batches();
        Ok(Self {
            window,
            pools,
            metrics: Arc::new(BatcherMetrics::default()),
            current,
        })
    }

    /// Handle consumers use to return finished batches to the pools
    pub fn recycler(&self) -> Recycler {
        Recycler::new(Arc::clone(&self.pools))
    }

    /// Batching counters; valid for the lifetime of the pipeline
    pub fn metrics(&self) -> Arc<BatcherMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the stage until the input channel closes
    pub async fn run(mut self, mut input: EntryReceiver, out: mpsc::Sender<Batches>) {
        let mut ticker = time::interval_at(Instant::now() + self.window, self.window);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                received = input.recv() => match received {
                    Some(entry) => self.handle_entry(entry),
                    None => break,
                },
                _ = ticker.tick() => {
                    if self.current.is_empty() {
                        continue;
                    }
                    let full = std::mem::replace(&mut self.current, self.pools.get_batches());
                    self.metrics.record_emitted();
                    if out.send(full).await.is_err() {
                        warn!("batch output closed, stopping batcher");
                        break;
                    }
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        debug!(
            entries_received = snapshot.entries_received,
            entries_dropped = snapshot.entries_dropped,
            batches_emitted = snapshot.batches_emitted,
            pending = self.current.entry_count(),
            "batcher shutting down"
        );
    }

    /// Key an entry into the current window
    fn handle_entry(&mut self, entry: Entry) {
        let uid = entry.uid().clone();
        if uid.is_empty() {
            self.metrics.record_dropped();
            error!(entry_type = %entry.entry_type(), "entry has no uid, dropping");
            return;
        }
        self.metrics.record_received();

        // Overwrite is the dedup rule: the newest event for a uid wins.
        self.current
            .batches
            .entry(entry.entry_type())
            .or_insert_with(|| self.pools.get_batch())
            .insert(uid, entry);
    }
}

#[cfg(test)]
#[path = "batcher_test.rs"]
mod tests;
