//! Crier
//!
//! Crier observes object changes in a Kubernetes control plane, normalizes
//! them into a uniform change envelope, redacts credential-shaped env
//! values, coalesces changes into time-windowed batches deduplicated by
//! object identity, and fans the batches out to any number of independent
//! processors.
//!
//! # Architecture
//!
//! ```text
//! [Readers]                                [Stages]                        [Processors]
//!    informer ──┐                                                           ┌──→ audit
//!    pv ────────┼──→ shared input ──→ PreProcess ──→ Secrets ──→ Batcher ──→│Router
//!    custom ────┘       mpsc           (optional)    redaction   dedup      └──→ export
//! ```
//!
//! Every stage is one task reading its input channel until it closes, then
//! closing its own output: dropping the [`Runner`] and every reader is the
//! whole shutdown story. Slow processors lose batches instead of stalling
//! the pipeline.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use crier::{InformerReader, Options, Runner, Watches, DEFAULT_INPUT_CAPACITY};
//! use tokio::sync::mpsc;
//!
//! let (input_tx, input_rx) = mpsc::channel(DEFAULT_INPUT_CAPACITY);
//! let mut runner = Runner::new(input_tx, input_rx, Duration::from_secs(5), Options::default())?;
//!
//! let (audit_tx, mut audit_rx) = mpsc::channel(16);
//! runner.add_processor("audit", audit_tx)?;
//!
//! let client = kube::Client::try_default().await?;
//! runner.add_reader(Box::new(InformerReader::new(client, Watches::all())?)).await?;
//! runner.start().await?;
//!
//! let recycler = runner.recycler();
//! while let Some(batches) = audit_rx.recv().await {
//!     for entry in batches.entries() {
//!         // inspect the change; entries are read-only from here on
//!     }
//!     recycler.recycle(batches);
//! }
//! ```

pub use crier_model::{
    corev1, Change, ChangeType, Entry, EntryType, Informer, InformerChange, K8sObject, ModelError,
    ObjectRef, ObjectType, PersistentVolume, SourceData, Uid,
};
pub use crier_pipeline::{
    Batch, Batcher, BatcherMetrics, BatcherSnapshot, Batches, BatchesReceiver, BatchesSender,
    BoxError, EntryReceiver, EntrySender, Options, PipelineError, PoolMetrics, PreProcess,
    PreProcessor, Reader, Recycler, Router, RouterMetrics, RouterSnapshot, Runner, Secrets,
    SinkHandle, DEFAULT_INPUT_CAPACITY, DEFAULT_STAGE_CAPACITY, REDACTED,
};
pub use crier_readers::{ChannelReader, InformerReader, PersistentVolumeReader, ReaderError, Watches};
