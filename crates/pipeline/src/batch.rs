//! Batch containers
//!
//! A [`Batch`] holds every coalesced change for one entry type inside one
//! window, keyed by object uid. A [`Batches`] maps entry types to their
//! batches and is the value the router fans out to processors.
//!
//! Iteration order over entry types and over uids is unspecified.

use std::collections::HashMap;
use std::sync::Arc;

use crier_model::{Entry, EntryType, Uid};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::EntryReceiver;

/// Uid-keyed map of entries of a single entry type, covering one window
///
/// The newest entry for a uid wins: inserting under an existing key
/// replaces the previous entry. That overwrite is the batch deduplication
/// rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub(crate) entries: HashMap<Uid, Entry>,
}

impl Batch {
    /// Look up the entry for a uid
    pub fn get(&self, uid: &Uid) -> Option<&Entry> {
        self.entries.get(uid)
    }

    /// Number of entries in the batch
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the batch holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the batch in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&Uid, &Entry)> {
        self.entries.iter()
    }

    /// Insert an entry, replacing any previous entry with the same uid
    pub(crate) fn insert(&mut self, uid: Uid, entry: Entry) {
        self.entries.insert(uid, entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Entry-type-keyed map of [`Batch`] values, emitted once per window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batches {
    pub(crate) batches: HashMap<EntryType, Batch>,
}

impl Batches {
    /// Look up the batch for an entry type
    pub fn get(&self, entry_type: EntryType) -> Option<&Batch> {
        self.batches.get(&entry_type)
    }

    /// Number of non-empty entry types
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when no entry type has a batch
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Iterate the per-type batches in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&EntryType, &Batch)> {
        self.batches.iter()
    }

    /// Iterate every entry across all batches, borrowing
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.batches.values().flat_map(|b| b.entries.values())
    }

    /// Total entry count across all batches
    pub fn entry_count(&self) -> usize {
        self.batches.values().map(Batch::len).sum()
    }

    /// Lazily stream every entry on a channel
    ///
    /// Spawns a producer task that sends each entry (in unspecified order)
    /// and closes the channel when exhausted or when `token` is cancelled.
    /// Cancelling lets a processor bound its work without draining. Clone
    /// the `Arc` first to keep the batches for further use.
    pub fn stream(self: Arc<Self>, token: CancellationToken) -> EntryReceiver {
        let (tx, rx) = mpsc::channel(1);
        let batches = self;

        tokio::spawn(async move {
            for batch in batches.batches.values() {
                for entry in batch.entries.values() {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        sent = tx.send(entry.clone()) => {
                            if sent.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        rx
    }

    pub(crate) fn clear(&mut self) {
        self.batches.clear();
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
