//! Shared list-watch machinery
//!
//! One generic watch loop drives every watch-backed reader: it opens a
//! `kube` watcher stream for a kind, classifies raw events into changes
//! through a per-kind [`Tracker`], and publishes the resulting entries.
//!
//! The watch stream only carries the current object state, so the tracker
//! caches the last seen object per uid. That cache is what lets an update
//! carry its previous state, and what turns a re-list into adds, updates
//! and deletes for objects that vanished while the watch was down.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use futures::TryStreamExt;
use kube::api::Api;
use kube::runtime::watcher::{self, Event};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crier_model::{Change, Entry, K8sObject, ModelError, Uid};
use crier_pipeline::EntrySender;

/// Backoff ceiling between watch restarts
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Initial backoff after a watch failure
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// A kind the watch loop can observe and wrap into entries
pub(crate) trait WatchedObject:
    K8sObject + kube::Resource<DynamicType = ()> + DeserializeOwned + Debug
{
    /// Wrap a change of this kind into the matching entry envelope
    fn entry(change: Change<Self>) -> Result<Entry, ModelError>;
}

/// Per-kind cache of the last seen object state, keyed by uid
///
/// Classifies watch events into Add/Update/Delete changes. Objects without
/// a uid cannot be keyed and are logged and skipped.
pub(crate) struct Tracker<K: WatchedObject> {
    known: HashMap<Uid, Arc<K>>,
}

impl<K: WatchedObject> Tracker<K> {
    pub(crate) fn new() -> Self {
        Self {
            known: HashMap::new(),
        }
    }

    /// Handle an applied (added or modified) object
    ///
    /// First sight of a uid is an Add; a cached prior state makes it an
    /// Update carrying that state as the old object.
    pub(crate) fn applied(&mut self, obj: K) -> Option<Entry> {
        let uid = obj.uid();
        if uid.is_empty() {
            warn!(kind = %K::OBJECT_TYPE, name = ?obj.name(), "object has no uid, skipping");
            return None;
        }

        let obj = Arc::new(obj);
        let change = match self.known.insert(uid, Arc::clone(&obj)) {
            Some(previous) => Change::update(obj, previous),
            None => Change::add(obj),
        };
        self.entry(change)
    }

    /// Handle a deleted object
    pub(crate) fn deleted(&mut self, obj: K) -> Option<Entry> {
        let uid = obj.uid();
        if uid.is_empty() {
            warn!(kind = %K::OBJECT_TYPE, name = ?obj.name(), "object has no uid, skipping");
            return None;
        }

        self.known.remove(&uid);
        self.entry(Change::delete(obj))
    }

    /// Handle a re-list after the watch (re)started
    ///
    /// Every listed object is applied; cached objects missing from the
    /// list emit deletes.
    pub(crate) fn restarted(&mut self, objs: Vec<K>) -> Vec<Entry> {
        let mut listed = HashSet::with_capacity(objs.len());
        let mut entries = Vec::with_capacity(objs.len());

        for obj in objs {
            let uid = obj.uid();
            if uid.is_empty() {
                warn!(kind = %K::OBJECT_TYPE, name = ?obj.name(), "object has no uid, skipping");
                continue;
            }
            listed.insert(uid);
            if let Some(entry) = self.applied(obj) {
                entries.push(entry);
            }
        }

        let vanished: Vec<Uid> = self
            .known
            .keys()
            .filter(|uid| !listed.contains(*uid))
            .cloned()
            .collect();
        for uid in vanished {
            if let Some(previous) = self.known.remove(&uid) {
                entries.extend(self.entry(Change::delete(previous)));
            }
        }

        entries
    }

    fn entry(&self, change: Change<K>) -> Option<Entry> {
        match K::entry(change) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(kind = %K::OBJECT_TYPE, error = %err, "invalid change, skipping");
                None
            }
        }
    }
}

/// Watch one kind until the shared input channel closes
///
/// Restarts the watch with doubling backoff on stream errors. Returns only
/// when the output channel is gone.
pub(crate) async fn watch_kind<K: WatchedObject>(api: Api<K>, out: EntrySender) {
    let mut tracker = Tracker::new();
    let mut backoff = INITIAL_BACKOFF;

    loop {
        let stream = watcher::watcher(api.clone(), watcher::Config::default());
        futures::pin_mut!(stream);

        loop {
            match stream.try_next().await {
                Ok(Some(Event::Applied(obj))) => {
                    backoff = INITIAL_BACKOFF;
                    if !publish(tracker.applied(obj), &out).await {
                        return;
                    }
                }
                Ok(Some(Event::Deleted(obj))) => {
                    backoff = INITIAL_BACKOFF;
                    if !publish(tracker.deleted(obj), &out).await {
                        return;
                    }
                }
                Ok(Some(Event::Restarted(objs))) => {
                    backoff = INITIAL_BACKOFF;
                    debug!(kind = %K::OBJECT_TYPE, count = objs.len(), "watch restarted");
                    for entry in tracker.restarted(objs) {
                        if !publish(Some(entry), &out).await {
                            return;
                        }
                    }
                }
                Ok(None) => {
                    warn!(kind = %K::OBJECT_TYPE, "watch stream ended, restarting");
                    break;
                }
                Err(err) => {
                    warn!(
                        kind = %K::OBJECT_TYPE,
                        error = %err,
                        backoff = ?backoff,
                        "watch stream error, restarting"
                    );
                    break;
                }
            }
        }

        if out.is_closed() {
            debug!(kind = %K::OBJECT_TYPE, "input channel closed, stopping watch");
            return;
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Send an entry to the shared input; false when the channel is gone
async fn publish(entry: Option<Entry>, out: &EntrySender) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    if out.send(entry).await.is_err() {
        debug!("input channel closed, stopping watch");
        return false;
    }
    true
}

#[cfg(test)]
#[path = "watch_test.rs"]
mod tests;
