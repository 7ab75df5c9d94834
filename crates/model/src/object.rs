//! Object taxonomy
//!
//! `ObjectType` names the kind of control-plane object a change concerns,
//! and `K8sObject` is the capability every watched kind provides to the
//! envelope: a compile-time kind tag plus identity accessors. Adding a new
//! kind means implementing `K8sObject` for it and extending the envelope
//! with a matching variant.

use std::fmt;

use k8s_openapi::api::core::v1::{Namespace, Node, PersistentVolume, Pod};

use crate::uid::Uid;

/// The kind of object held inside a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// A cluster node
    Node,
    /// A pod
    Pod,
    /// A namespace
    Namespace,
    /// A persistent volume
    PersistentVolume,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Node => "Node",
            Self::Pod => "Pod",
            Self::Namespace => "Namespace",
            Self::PersistentVolume => "PersistentVolume",
        };
        write!(f, "{s}")
    }
}

/// Capability implemented by every Kubernetes object kind the pipeline
/// carries
///
/// The associated `OBJECT_TYPE` ties the kind tag to the concrete type at
/// compile time, so a `Change<Pod>` can never claim to be a node change.
pub trait K8sObject: Clone + Send + Sync + 'static {
    /// The kind tag for this object type
    const OBJECT_TYPE: ObjectType;

    /// The `metadata.uid` of the object; empty when unset
    fn uid(&self) -> Uid;

    /// The `metadata.name` of the object
    fn name(&self) -> Option<&str>;
}

macro_rules! impl_k8s_object {
    ($ty:ty, $object_type:expr) => {
        impl K8sObject for $ty {
            const OBJECT_TYPE: ObjectType = $object_type;

            fn uid(&self) -> Uid {
                self.metadata
                    .uid
                    .as_deref()
                    .map(Uid::from)
                    .unwrap_or_default()
            }

            fn name(&self) -> Option<&str> {
                self.metadata.name.as_deref()
            }
        }
    };
}

impl_k8s_object!(Node, ObjectType::Node);
impl_k8s_object!(Pod, ObjectType::Pod);
impl_k8s_object!(Namespace, ObjectType::Namespace);
impl_k8s_object!(PersistentVolume, ObjectType::PersistentVolume);
