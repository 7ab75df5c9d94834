//! Crier - Data model
//!
//! The change envelope that flows through the crier pipeline. Every watch
//! event a reader observes is normalized into an [`Entry`]: a uniform
//! envelope that lets a single channel carry changes for every object kind.
//!
//! # Architecture
//!
//! ```text
//! Entry
//!  └── SourceData               (which reader family produced it)
//!       ├── Informer            (Node / Pod / Namespace)
//!       │    └── Change<T>      (Add / Update / Delete, old + new objects)
//!       └── PersistentVolume
//!            └── Change<PersistentVolume>
//! ```
//!
//! # Key Design
//!
//! - **Sum types everywhere**: [`SourceData`], the informer payload, and the
//!   type tags ([`EntryType`], [`ObjectType`], [`ChangeType`]) are enums, so
//!   a tag can never disagree with its payload.
//! - **Validated construction**: [`Change::new`], [`Informer::new`] and
//!   [`PersistentVolume::new`] enforce the change invariants (Add carries
//!   only a new object, Delete only an old one, Update both) and return
//!   [`ModelError`] on violation.
//! - **Cheap clones**: change payloads are `Arc`-wrapped so entries can be
//!   fanned out and iterated without copying Kubernetes objects.
//!
//! # Example
//!
//! ```ignore
//! use crier_model::{corev1, Change, Entry, Informer};
//!
//! let pod = corev1::Pod::default();
//! let entry = Entry::new(Informer::new(Change::add(pod))?);
//! assert_eq!(entry.entry_type(), crier_model::EntryType::Informer);
//! ```

mod change;
mod entry;
mod error;
mod object;
mod uid;

pub use change::{Change, ChangeType};
pub use entry::{
    Entry, EntryType, Informer, InformerChange, ObjectRef, PersistentVolume, SourceData,
};
pub use error::ModelError;
pub use object::{K8sObject, ObjectType};
pub use uid::Uid;

/// Core Kubernetes object types carried by the pipeline.
///
/// Re-exported so downstream crates do not need their own `k8s-openapi`
/// version pin for the common cases.
pub mod corev1 {
    pub use k8s_openapi::api::core::v1::{
        Container, EnvVar, Namespace, Node, PersistentVolume, Pod, PodSpec,
    };
    pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
}
