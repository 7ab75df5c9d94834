//! Secrets - Redaction stage
//!
//! Scrubs credential-shaped values from entries before they reach
//! downstream processors. Pod container environment variables whose names
//! look like credentials get their values overwritten with [`REDACTED`];
//! every other entry passes through untouched.
//!
//! Detection is name-based, not value-based: env values are opaque, but the
//! taxonomy of names is under operator control.
//!
//! Entries are forwarded in the order they were received. Redaction happens
//! in place; that is sound because processors are read-only by contract and
//! no earlier stage retains a reference once an entry is sent.

use crier_model::{Entry, EntryType, ObjectType};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{EntryReceiver, EntrySender};

/// Replacement value for credential-shaped env vars
pub const REDACTED: &str = "REDACTED";

/// Credential-shaped env var names, matched case-insensitively as
/// substrings
static CREDENTIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(token|pass|pwd|jwt|hash|secret|bearer|cred|secure|signing|cert|code|key)")
        .expect("credential pattern must compile")
});

/// The redaction stage
///
/// Consumes entries from its input channel, applies [`Secrets::scrub`] to
/// each, and forwards them in order. The output closes when the input
/// closes.
#[derive(Debug, Default)]
pub struct Secrets;

impl Secrets {
    pub fn new() -> Self {
        Self
    }

    /// Run the stage until the input channel closes
    pub async fn run(self, mut input: EntryReceiver, out: EntrySender) {
        while let Some(mut entry) = input.recv().await {
            Self::scrub(&mut entry);
            if out.send(entry).await.is_err() {
                break;
            }
        }
        debug!("redaction stage shutting down");
    }

    /// Redact credential-shaped env values on a single entry
    ///
    /// Only informer entries wrapping pod changes are touched.
    pub fn scrub(entry: &mut Entry) {
        if entry.entry_type() != EntryType::Informer {
            return;
        }
        let Ok(informer) = entry.informer_mut() else {
            return;
        };
        if informer.object_type() != ObjectType::Pod {
            return;
        }
        let Ok(change) = informer.pod_mut() else {
            return;
        };
        if let Some(pod) = change.latest_mut() {
            scrub_pod(pod);
        }
    }
}

fn scrub_pod(pod: &mut crier_model::corev1::Pod) {
    let Some(spec) = pod.spec.as_mut() else {
        return;
    };
    for container in &mut spec.containers {
        let Some(env) = container.env.as_mut() else {
            continue;
        };
        for var in env {
            if CREDENTIAL_RE.is_match(&var.name) {
                var.value = Some(REDACTED.to_string());
            }
        }
    }
}

#[cfg(test)]
#[path = "secrets_test.rs"]
mod tests;
