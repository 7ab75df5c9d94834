//! Pre-processing stage
//!
//! An optional, ordered chain of mutators applied to entries before
//! redaction. This is the one place host code may alter entries; any change
//! made here is seen by every processor. An erroring processor drops the
//! entry (logged), and the stage keeps running.
//!
//! When no processors are configured the runner skips this stage entirely
//! and wires the shared input straight into the redactor.

use crier_model::Entry;
use tracing::{debug, warn};

use crate::error::BoxError;
use crate::{EntryReceiver, EntrySender};

/// A mutator applied to every entry before redaction
///
/// Implemented for plain closures:
///
/// ```ignore
/// let label = |entry: &mut Entry| -> Result<(), BoxError> {
///     // stamp, relabel, filter …
///     Ok(())
/// };
/// let options = Options::default().with_pre_processor(label);
/// ```
pub trait PreProcessor: Send + 'static {
    /// Name used in drop logs
    fn name(&self) -> &str {
        "pre-processor"
    }

    /// Process one entry; an error drops the entry
    fn process(&mut self, entry: &mut Entry) -> Result<(), BoxError>;
}

impl<F> PreProcessor for F
where
    F: FnMut(&mut Entry) -> Result<(), BoxError> + Send + 'static,
{
    fn process(&mut self, entry: &mut Entry) -> Result<(), BoxError> {
        self(entry)
    }
}

/// The pre-processing stage
///
/// Applies each processor in registration order to every entry. Entries for
/// which any processor errors are dropped.
pub struct PreProcess {
    procs: Vec<Box<dyn PreProcessor>>,
}

impl PreProcess {
    pub fn new(procs: Vec<Box<dyn PreProcessor>>) -> Self {
        Self { procs }
    }

    /// Number of configured processors
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    /// True when no processors are configured
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Run the stage until the input channel closes
    pub async fn run(mut self, mut input: EntryReceiver, out: EntrySender) {
        'entries: while let Some(mut entry) = input.recv().await {
            for proc in &mut self.procs {
                if let Err(err) = proc.process(&mut entry) {
                    warn!(
                        processor = proc.name(),
                        uid = %entry.uid(),
                        error = %err,
                        "pre-processor failed, dropping entry"
                    );
                    continue 'entries;
                }
            }
            if out.send(entry).await.is_err() {
                break;
            }
        }
        debug!("pre-processing stage shutting down");
    }
}

impl std::fmt::Debug for PreProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreProcess")
            .field("processors", &self.procs.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "preprocess_test.rs"]
mod tests;
