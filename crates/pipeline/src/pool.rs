//! Batch map pools
//!
//! High-event clusters emit a steady stream of windows, each allocating an
//! entry-type map plus one uid map per entry type. The pools recycle those
//! maps: the batcher takes cleared maps out, and consumers hand finished
//! batches back through [`Recycler`].
//!
//! Maps are cleared on return, so pooled maps keep their bucket capacity
//! from earlier windows. When a pool is full the returned map is simply
//! dropped.

use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::batch::{Batch, Batches};

/// How many maps of each shape a pool retains
const DEFAULT_POOL_CAPACITY: usize = 64;

/// Counters for pool effectiveness
///
/// All counters use relaxed ordering; values are eventually consistent.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Gets served from the pool
    hits: AtomicU64,
    /// Gets that had to allocate
    misses: AtomicU64,
    /// Maps returned to the pool
    returns: AtomicU64,
    /// Maps dropped because the pool was full
    drops: AtomicU64,
}

impl PoolMetrics {
    #[inline]
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_return(&self) {
        self.returns.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_drop(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets served from the pool
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Gets that had to allocate
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Maps returned to the pool
    pub fn returns(&self) -> u64 {
        self.returns.load(Ordering::Relaxed)
    }

    /// Maps dropped because the pool was full
    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }
}

/// Lock-free pools for [`Batches`] and [`Batch`] maps
///
/// Safe for concurrent get/put: the batcher takes maps out while consumers
/// recycle finished ones.
#[derive(Debug)]
pub(crate) struct BatchPools {
    batches: ArrayQueue<Batches>,
    maps: ArrayQueue<Batch>,
    metrics: PoolMetrics,
}

impl BatchPools {
    pub(crate) fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Create pools retaining up to `capacity` maps of each shape
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            batches: ArrayQueue::new(capacity.max(1)),
            maps: ArrayQueue::new(capacity.max(1)),
            metrics: PoolMetrics::default(),
        }
    }

    /// Take an empty [`Batches`], reusing a recycled one when available
    pub(crate) fn get_batches(&self) -> Batches {
        match self.batches.pop() {
            Some(batches) => {
                self.metrics.record_hit();
                batches
            }
            None => {
                self.metrics.record_miss();
                Batches::default()
            }
        }
    }

    /// Take an empty [`Batch`], reusing a recycled one when available
    pub(crate) fn get_batch(&self) -> Batch {
        match self.maps.pop() {
            Some(batch) => {
                self.metrics.record_hit();
                batch
            }
            None => {
                self.metrics.record_miss();
                Batch::default()
            }
        }
    }

    pub(crate) fn put_batches(&self, mut batches: Batches) {
        batches.clear();
        match self.batches.push(batches) {
            Ok(()) => self.metrics.record_return(),
            Err(_) => self.metrics.record_drop(),
        }
    }

    pub(crate) fn put_batch(&self, mut batch: Batch) {
        batch.clear();
        match self.maps.push(batch) {
            Ok(()) => self.metrics.record_return(),
            Err(_) => self.metrics.record_drop(),
        }
    }

    /// Pool effectiveness counters
    pub(crate) fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Maps of each shape currently pooled
    pub(crate) fn available(&self) -> (usize, usize) {
        (self.batches.len(), self.maps.len())
    }
}

impl Default for BatchPools {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle consumers use to return finished batches to the pools
///
/// Cloneable; every clone feeds the same pools.
#[derive(Debug, Clone)]
pub struct Recycler {
    pools: Arc<BatchPools>,
}

impl Recycler {
    pub(crate) fn new(pools: Arc<BatchPools>) -> Self {
        Self { pools }
    }

    /// Pool effectiveness counters
    pub fn metrics(&self) -> &PoolMetrics {
        self.pools.metrics()
    }

    /// Return a consumed [`Batches`] to the pools
    ///
    /// Only call once you are done reading. Reclaims the maps only when
    /// this is the last reference; while another sink still holds the same
    /// batches this is a no-op and their data stays intact.
    pub fn recycle(&self, batches: Arc<Batches>) {
        let Ok(mut owned) = Arc::try_unwrap(batches) else {
            tracing::trace!("batches still shared, skipping recycle");
            return;
        };

        for (_, batch) in owned.batches.drain() {
            self.pools.put_batch(batch);
        }
        self.pools.put_batches(owned);
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod tests;
