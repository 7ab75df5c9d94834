//! Runner - Pipeline orchestration
//!
//! The runner wires the stages into a linear chain of channels at
//! construction, owns reader and processor registrations, and sequences
//! startup: readers first, then the router.
//!
//! ```text
//! shared input ─→ [PreProcess] ─→ Secrets ─→ Batcher ─→ Router ─→ sinks
//! ```
//!
//! The intermediate channels default to capacity 1: throughput is set by
//! the stages downstream, not by buffering. The runner owns those channels;
//! readers and processors own only their endpoints.
//!
//! Shutdown is input closure, nothing else: drop the runner (it holds one
//! input sender for late reader registration) and every reader, and each
//! stage drains, exits, and closes its output in turn.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::batcher::Batcher;
use crate::error::{PipelineError, Result};
use crate::metrics::{BatcherMetrics, RouterMetrics};
use crate::pool::Recycler;
use crate::preprocess::{PreProcess, PreProcessor};
use crate::reader::Reader;
use crate::router::Router;
use crate::secrets::Secrets;
use crate::{BatchesSender, EntryReceiver, EntrySender};

/// Construction options for [`Runner::new`]
pub struct Options {
    pre_processors: Vec<Box<dyn PreProcessor>>,
    stage_capacity: usize,
}

impl Options {
    /// Append a pre-processor; processors run in the order added
    pub fn with_pre_processor(mut self, proc: impl PreProcessor) -> Self {
        self.pre_processors.push(Box::new(proc));
        self
    }

    /// Capacity of the intermediate stage channels (minimum 1)
    pub fn with_stage_capacity(mut self, capacity: usize) -> Self {
        self.stage_capacity = capacity.max(1);
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            pre_processors: Vec::new(),
            stage_capacity: crate::DEFAULT_STAGE_CAPACITY,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("pre_processors", &self.pre_processors.len())
            .field("stage_capacity", &self.stage_capacity)
            .finish()
    }
}

/// Orchestrator for the full pipeline
///
/// # Example
///
/// ```ignore
/// let (input_tx, input_rx) = mpsc::channel(DEFAULT_INPUT_CAPACITY);
/// let mut runner = Runner::new(input_tx, input_rx, Duration::from_secs(5), Options::default())?;
/// runner.add_processor("audit", processor_tx)?;
/// runner.add_reader(Box::new(reader)).await?;
/// runner.start().await?;
/// ```
pub struct Runner {
    input: EntrySender,
    readers: Vec<Box<dyn Reader>>,
    router: Router,
    router_input: Option<mpsc::Receiver<crate::Batches>>,
    recycler: Recycler,
    batcher_metrics: std::sync::Arc<BatcherMetrics>,
    started: bool,
}

impl Runner {
    /// Construct the pipeline around a host-created shared input channel
    ///
    /// `input` and `events` are the two halves of the same channel: the
    /// sender is handed to readers on registration, the receiver feeds the
    /// first stage. Stages other than the router start consuming
    /// immediately; the router starts on [`Runner::start`].
    pub fn new(
        input: EntrySender,
        events: EntryReceiver,
        window: Duration,
        options: Options,
    ) -> Result<Self> {
        let capacity = options.stage_capacity;

        // Pre-processing is only wired when processors are configured;
        // otherwise the shared input feeds the redactor directly.
        let secrets_input = if options.pre_processors.is_empty() {
            events
        } else {
            let (tx, rx) = mpsc::channel(capacity);
            tokio::spawn(PreProcess::new(options.pre_processors).run(events, tx));
            rx
        };

        let (batcher_tx, batcher_rx) = mpsc::channel(capacity);
        tokio::spawn(Secrets::new().run(secrets_input, batcher_tx));

        let (router_tx, router_rx) = mpsc::channel(capacity);
        let batcher = Batcher::new(window)?;
        let recycler = batcher.recycler();
        let batcher_metrics = batcher.metrics();
        tokio::spawn(batcher.run(batcher_rx, router_tx));

        Ok(Self {
            input,
            readers: Vec::new(),
            router: Router::new(),
            router_input: Some(router_rx),
            recycler,
            batcher_metrics,
            started: false,
        })
    }

    /// Register a reader
    ///
    /// Calls `set_out` with the shared input. Before [`Runner::start`] the
    /// reader is only accumulated; afterwards its `run` is invoked
    /// immediately, which permits staggering readers.
    pub async fn add_reader(&mut self, mut reader: Box<dyn Reader>) -> Result<()> {
        reader
            .set_out(self.input.clone())
            .map_err(PipelineError::Reader)?;
        if self.started {
            reader.run().await.map_err(PipelineError::Reader)?;
        }
        self.readers.push(reader);
        Ok(())
    }

    /// Register a processor channel with the router
    ///
    /// Fails after [`Runner::start`].
    pub fn add_processor(&mut self, name: impl Into<String>, out: BatchesSender) -> Result<()> {
        if self.started {
            return Err(PipelineError::RegisterAfterStart);
        }
        self.router.register(name, out)
    }

    /// Start the pipeline: run every accumulated reader, then the router
    ///
    /// Propagates the first reader error; readers that already started keep
    /// running until the shared input closes. Must be called exactly once.
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(PipelineError::AlreadyStarted);
        }
        if self.router.route_count() == 0 {
            return Err(PipelineError::NoRoutes);
        }

        for reader in &mut self.readers {
            reader.run().await.map_err(PipelineError::Reader)?;
        }

        let Some(router_rx) = self.router_input.take() else {
            return Err(PipelineError::AlreadyStarted);
        };
        self.router.start(router_rx)?;
        self.started = true;
        Ok(())
    }

    /// A clone of the shared input sender, for host-side producers
    pub fn input(&self) -> EntrySender {
        self.input.clone()
    }

    /// Handle consumers use to return finished batches to the pools
    pub fn recycler(&self) -> Recycler {
        self.recycler.clone()
    }

    /// Router fan-out counters
    pub fn router_metrics(&self) -> std::sync::Arc<RouterMetrics> {
        self.router.metrics()
    }

    /// Batcher counters
    pub fn batcher_metrics(&self) -> std::sync::Arc<BatcherMetrics> {
        std::sync::Arc::clone(&self.batcher_metrics)
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("readers", &self.readers.len())
            .field("routes", &self.router.route_count())
            .field("started", &self.started)
            .finish()
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
