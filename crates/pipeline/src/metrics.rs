//! Stage metrics
//!
//! Atomic counters for the batcher and router hot paths. All operations use
//! relaxed ordering; values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the router fan-out
///
/// Safe to read from any thread while the router runs.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Batches received on the router input
    batches_received: AtomicU64,
    /// Individual sink sends that succeeded
    deliveries: AtomicU64,
    /// Individual sink sends dropped (full or closed sink)
    drops: AtomicU64,
}

impl RouterMetrics {
    #[inline]
    pub(crate) fn record_received(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delivered(&self) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Batches received on the router input
    #[inline]
    pub fn batches_received(&self) -> u64 {
        self.batches_received.load(Ordering::Relaxed)
    }

    /// Individual sink sends that succeeded
    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    /// Individual sink sends dropped
    #[inline]
    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> RouterSnapshot {
        RouterSnapshot {
            batches_received: self.batches_received(),
            deliveries: self.deliveries(),
            drops: self.drops(),
        }
    }
}

/// Point-in-time snapshot of router counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouterSnapshot {
    pub batches_received: u64,
    pub deliveries: u64,
    pub drops: u64,
}

/// Counters for the batching stage
#[derive(Debug, Default)]
pub struct BatcherMetrics {
    /// Entries accepted into a window
    entries_received: AtomicU64,
    /// Entries dropped for missing uid
    entries_dropped: AtomicU64,
    /// Windows emitted downstream
    batches_emitted: AtomicU64,
}

impl BatcherMetrics {
    #[inline]
    pub(crate) fn record_received(&self) {
        self.entries_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.entries_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_emitted(&self) {
        self.batches_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Entries accepted into a window
    #[inline]
    pub fn entries_received(&self) -> u64 {
        self.entries_received.load(Ordering::Relaxed)
    }

    /// Entries dropped for missing uid
    #[inline]
    pub fn entries_dropped(&self) -> u64 {
        self.entries_dropped.load(Ordering::Relaxed)
    }

    /// Windows emitted downstream
    #[inline]
    pub fn batches_emitted(&self) -> u64 {
        self.batches_emitted.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> BatcherSnapshot {
        BatcherSnapshot {
            entries_received: self.entries_received(),
            entries_dropped: self.entries_dropped(),
            batches_emitted: self.batches_emitted(),
        }
    }
}

/// Point-in-time snapshot of batcher counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatcherSnapshot {
    pub entries_received: u64,
    pub entries_dropped: u64,
    pub batches_emitted: u64,
}
