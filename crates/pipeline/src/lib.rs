//! Crier - Pipeline
//!
//! The in-process dataflow engine: readers publish change entries onto a
//! shared input channel, and a chain of stage tasks turns them into
//! redacted, time-windowed, deduplicated batches fanned out to every
//! registered processor.
//!
//! # Architecture
//!
//! ```text
//! [Readers]                                  [Stages]                       [Processors]
//!    informer ──┐                                                            ┌──→ audit
//!    pv ────────┼──→ mpsc ──→ [PreProcess] ──→ Secrets ──→ Batcher ──→ Router┼──→ export
//!    custom ────┘              (optional)      redact      dedup      try_send└──→ …
//! ```
//!
//! # Key Design
//!
//! - **Channel-per-stage**: every stage is one task that owns its input
//!   `Receiver` and the next stage's `Sender`. A stage exiting drops its
//!   sender, so closing the shared input tears the whole pipeline down in
//!   order, with no global stop signal.
//! - **Arc fan-out**: the router wraps each [`Batches`] in `Arc` so N sinks
//!   share one batch without copying.
//! - **Backpressure becomes drops**: the router never blocks on a sink; a
//!   full processor channel loses that batch (logged with the sink name).
//! - **Map recycling**: consumed batches can be handed back through
//!   [`Recycler`] so the batcher reuses the maps instead of reallocating.
//!
//! # Example
//!
//! ```ignore
//! use crier_pipeline::{Options, Runner};
//! use tokio::sync::mpsc;
//!
//! let (input_tx, input_rx) = mpsc::channel(crier_pipeline::DEFAULT_INPUT_CAPACITY);
//! let mut runner = Runner::new(input_tx, input_rx, Duration::from_secs(5), Options::default())?;
//!
//! let (proc_tx, mut proc_rx) = mpsc::channel(10);
//! runner.add_processor("audit", proc_tx)?;
//! runner.add_reader(Box::new(reader)).await?;
//! runner.start().await?;
//!
//! while let Some(batches) = proc_rx.recv().await {
//!     for entry in batches.entries() { /* … */ }
//!     runner.recycler().recycle(batches);
//! }
//! ```

mod batch;
mod batcher;
mod error;
mod metrics;
mod pool;
mod preprocess;
mod reader;
mod router;
mod runner;
mod secrets;
mod sink_handle;

pub use batch::{Batch, Batches};
pub use batcher::Batcher;
pub use error::{BoxError, PipelineError, Result};
pub use metrics::{BatcherMetrics, BatcherSnapshot, RouterMetrics, RouterSnapshot};
pub use pool::{PoolMetrics, Recycler};
pub use preprocess::{PreProcess, PreProcessor};
pub use reader::Reader;
pub use router::Router;
pub use runner::{Options, Runner};
pub use secrets::{Secrets, REDACTED};
pub use sink_handle::SinkHandle;

use std::sync::Arc;

use crier_model::Entry;
use tokio::sync::mpsc;

/// Sender half of an entry channel
pub type EntrySender = mpsc::Sender<Entry>;

/// Receiver half of an entry channel
pub type EntryReceiver = mpsc::Receiver<Entry>;

/// Sender half of a processor channel
pub type BatchesSender = mpsc::Sender<Arc<Batches>>;

/// Receiver half of a processor channel
pub type BatchesReceiver = mpsc::Receiver<Arc<Batches>>;

/// Default capacity for the intermediate stage channels
///
/// Throughput between stages is set by the slowest stage downstream, so the
/// intermediate channels only need to decouple task wakeups.
pub const DEFAULT_STAGE_CAPACITY: usize = 1;

/// Suggested capacity for the shared input channel
///
/// The initial watch snapshot of a large cluster emits tens of thousands of
/// Add events in a short interval; size the input so readers do not stall
/// behind it.
pub const DEFAULT_INPUT_CAPACITY: usize = 5_000;
