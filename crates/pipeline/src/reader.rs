//! Reader contract
//!
//! A reader turns native watch callbacks into entries published on the
//! shared input channel. The pipeline core consumes only this contract;
//! concrete readers live in the `crier-readers` crate (or in host code).

use async_trait::async_trait;

use crate::error::BoxError;
use crate::EntrySender;

/// A producer of entries for the shared input channel
///
/// Readers must only publish entries that satisfy the change invariants:
/// an event that cannot be turned into a valid change is logged and
/// skipped, never sent.
///
/// The shared input channel is owned by the [`crate::Runner`]; readers hold
/// sender clones and close nothing themselves.
#[async_trait]
pub trait Reader: Send {
    /// Set the shared input channel the reader publishes to
    ///
    /// Must fail and be a no-op once [`Reader::run`] has succeeded.
    /// Idempotent before that.
    fn set_out(&mut self, out: EntrySender) -> Result<(), BoxError>;

    /// Start producing entries
    ///
    /// May succeed at most once; later calls must fail. Fails when no
    /// output channel has been set.
    async fn run(&mut self) -> Result<(), BoxError>;
}
