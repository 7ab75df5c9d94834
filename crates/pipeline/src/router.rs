//! Router - Batch fan-out
//!
//! The router broadcasts every [`Batches`] arriving on its input channel to
//! all registered processor channels.
//!
//! # Design
//!
//! - Batches are wrapped in `Arc` once and shared across sinks (zero-copy
//!   fan-out).
//! - Delivery is non-blocking: a full sink channel loses that batch and a
//!   drop is logged with the sink name. This is the pipeline's backpressure
//!   policy; a blocking send here would couple every consumer to the
//!   slowest one.
//! - The router terminates solely on input closure. It takes no
//!   cancellation signal: when the input channel closes, the fan-out task
//!   drops every sink sender, closing each registered channel exactly once.
//!
//! A processor's channel capacity is therefore a contract with the
//! operator: size it to the expected window cadence and consumer latency.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::batch::Batches;
use crate::error::PipelineError;
use crate::metrics::RouterMetrics;
use crate::sink_handle::SinkHandle;
use crate::BatchesSender;

/// Registry of named processor channels and the fan-out that feeds them
///
/// # Example
///
/// ```ignore
/// let mut router = Router::new();
/// let (tx, mut rx) = mpsc::channel(10);
/// router.register("audit", tx)?;
/// router.start(batches_rx)?;
/// // rx now receives every emitted Arc<Batches>.
/// ```
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<SinkHandle>,
    started: bool,
    metrics: Arc<RouterMetrics>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named processor channel
    ///
    /// Fails after [`Router::start`], for an empty name, and for a name
    /// that is already registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        out: BatchesSender,
    ) -> Result<(), PipelineError> {
        if self.started {
            return Err(PipelineError::RegisterAfterStart);
        }
        let name = name.into();
        if name.is_empty() {
            return Err(PipelineError::EmptyRouteName);
        }
        if self.routes.iter().any(|route| route.name() == name) {
            return Err(PipelineError::DuplicateRoute(name));
        }

        debug!(sink = %name, "registered route");
        self.routes.push(SinkHandle::new(name, out));
        Ok(())
    }

    /// Number of registered routes
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Fan-out counters; valid for the lifetime of the pipeline
    pub fn metrics(&self) -> Arc<RouterMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Start broadcasting batches from `input`
    ///
    /// Spawns the fan-out task. Fails when no routes are registered or when
    /// called a second time. Stop the router by closing `input`.
    pub fn start(&mut self, input: mpsc::Receiver<Batches>) -> Result<(), PipelineError> {
        if self.started {
            return Err(PipelineError::AlreadyStarted);
        }
        if self.routes.is_empty() {
            return Err(PipelineError::NoRoutes);
        }
        self.started = true;

        let routes = std::mem::take(&mut self.routes);
        let metrics = Arc::clone(&self.metrics);
        tokio::spawn(fan_out(input, routes, metrics));
        Ok(())
    }
}

async fn fan_out(
    mut input: mpsc::Receiver<Batches>,
    routes: Vec<SinkHandle>,
    metrics: Arc<RouterMetrics>,
) {
    info!(sinks = routes.len(), "router starting");

    while let Some(batches) = input.recv().await {
        metrics.record_received();
        let batches = Arc::new(batches);

        for route in &routes {
            match route.try_send(Arc::clone(&batches)) {
                Ok(()) => metrics.record_delivered(),
                Err(TrySendError::Full(_)) => {
                    metrics.record_dropped();
                    warn!(sink = route.name(), "dropping batches for slow consumer");
                }
                Err(TrySendError::Closed(_)) => {
                    metrics.record_dropped();
                    debug!(sink = route.name(), "sink channel closed, dropping batches");
                }
            }
        }
    }

    let snapshot = metrics.snapshot();
    info!(
        batches_received = snapshot.batches_received,
        deliveries = snapshot.deliveries,
        drops = snapshot.drops,
        "router shutting down"
    );
    // Dropping the routes here closes every registered sink channel.
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
