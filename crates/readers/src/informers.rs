//! Informer reader
//!
//! Streams node, pod and namespace changes from the API server, one watch
//! task per selected kind. All three kinds publish `Informer` entries onto
//! the same shared input channel.

use async_trait::async_trait;
use kube::api::Api;
use kube::Client;
use tracing::info;

use crier_model::{corev1, Change, Entry, Informer, ModelError};
use crier_pipeline::{BoxError, EntrySender, Reader};

use crate::error::ReaderError;
use crate::watch::{watch_kind, WatchedObject};

impl WatchedObject for corev1::Node {
    fn entry(change: Change<Self>) -> Result<Entry, ModelError> {
        Ok(Entry::new(Informer::new(change)?))
    }
}

impl WatchedObject for corev1::Pod {
    fn entry(change: Change<Self>) -> Result<Entry, ModelError> {
        Ok(Entry::new(Informer::new(change)?))
    }
}

impl WatchedObject for corev1::Namespace {
    fn entry(change: Change<Self>) -> Result<Entry, ModelError> {
        Ok(Entry::new(Informer::new(change)?))
    }
}

/// Which kinds an [`InformerReader`] watches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Watches {
    pub nodes: bool,
    pub pods: bool,
    pub namespaces: bool,
}

impl Watches {
    /// Watch every supported kind
    pub fn all() -> Self {
        Self {
            nodes: true,
            pods: true,
            namespaces: true,
        }
    }

    /// True when no kind is selected
    pub fn is_empty(&self) -> bool {
        !self.nodes && !self.pods && !self.namespaces
    }
}

/// Reader streaming node/pod/namespace changes from the API server
///
/// # Example
///
/// ```ignore
/// let client = kube::Client::try_default().await?;
/// let reader = InformerReader::new(client, Watches::all())?;
/// runner.add_reader(Box::new(reader)).await?;
/// ```
pub struct InformerReader {
    client: Client,
    watches: Watches,
    out: Option<EntrySender>,
    started: bool,
}

impl InformerReader {
    /// Create a reader for the selected kinds
    ///
    /// Fails when no kind is selected.
    pub fn new(client: Client, watches: Watches) -> Result<Self, ReaderError> {
        if watches.is_empty() {
            return Err(ReaderError::NoKinds);
        }
        Ok(Self {
            client,
            watches,
            out: None,
            started: false,
        })
    }
}

#[async_trait]
impl Reader for InformerReader {
    fn set_out(&mut self, out: EntrySender) -> Result<(), BoxError> {
        if self.started {
            return Err(ReaderError::SetOutAfterRun.into());
        }
        self.out = Some(out);
        Ok(())
    }

    async fn run(&mut self) -> Result<(), BoxError> {
        if self.started {
            return Err(ReaderError::AlreadyStarted.into());
        }
        let Some(out) = self.out.clone() else {
            return Err(ReaderError::NoOutput.into());
        };
        self.started = true;

        info!(watches = ?self.watches, "informer reader starting");
        if self.watches.nodes {
            let api: Api<corev1::Node> = Api::all(self.client.clone());
            tokio::spawn(watch_kind(api, out.clone()));
        }
        if self.watches.pods {
            let api: Api<corev1::Pod> = Api::all(self.client.clone());
            tokio::spawn(watch_kind(api, out.clone()));
        }
        if self.watches.namespaces {
            let api: Api<corev1::Namespace> = Api::all(self.client.clone());
            tokio::spawn(watch_kind(api, out.clone()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for InformerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InformerReader")
            .field("watches", &self.watches)
            .field("started", &self.started)
            .finish()
    }
}
