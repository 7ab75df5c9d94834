//! Crier - Readers
//!
//! Concrete producers for the pipeline's shared input channel. Each reader
//! turns control-plane watch events into validated change entries and
//! publishes them through the [`Reader`] contract
//! (`set_out` once, then `run` once).
//!
//! - [`InformerReader`] — list-watches any subset of nodes, pods and
//!   namespaces.
//! - [`PersistentVolumeReader`] — list-watches persistent volumes.
//! - [`ChannelReader`] — bridges an externally produced entry stream onto
//!   the shared input (custom producers, tests).
//!
//! The watch-backed readers keep a per-kind uid cache so update events
//! carry the previous object state, and diff re-lists against it so objects
//! that vanished while the watch was down still emit deletes.
//!
//! Readers never close the shared input channel: they hold sender clones,
//! and the channel closes when every clone is gone.

mod channel;
mod error;
mod informers;
mod persistent_volumes;
mod watch;

pub use channel::ChannelReader;
pub use error::ReaderError;
pub use informers::{InformerReader, Watches};
pub use persistent_volumes::PersistentVolumeReader;

pub use crier_pipeline::Reader;
