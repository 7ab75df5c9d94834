//! Persistent-volume reader
//!
//! Streams persistent-volume changes from the API server through the same
//! watch machinery as the informer reader, wrapped as `PersistentVolume`
//! entries.

use async_trait::async_trait;
use kube::api::Api;
use kube::Client;
use tracing::info;

use crier_model::{corev1, Change, Entry, ModelError, PersistentVolume as PersistentVolumeData};
use crier_pipeline::{BoxError, EntrySender, Reader};

use crate::error::ReaderError;
use crate::watch::{watch_kind, WatchedObject};

impl WatchedObject for corev1::PersistentVolume {
    fn entry(change: Change<Self>) -> Result<Entry, ModelError> {
        Ok(Entry::new(PersistentVolumeData::new(change)?))
    }
}

/// Reader streaming persistent-volume changes from the API server
pub struct PersistentVolumeReader {
    client: Client,
    out: Option<EntrySender>,
    started: bool,
}

impl PersistentVolumeReader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            out: None,
            started: false,
        }
    }
}

#[async_trait]
impl Reader for PersistentVolumeReader {
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

        info!("persistent volume reader starting");
        let api: Api<corev1::PersistentVolume> = Api::all(self.client.clone());
        tokio::spawn(watch_kind(api, out));
        Ok(())
    }
}

impl std::fmt::Debug for PersistentVolumeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentVolumeReader")
            .field("started", &self.started)
            .finish()
    }
}
