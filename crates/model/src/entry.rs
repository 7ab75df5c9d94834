//! Entry envelope
//!
//! [`Entry`] is the uniform envelope the pipeline channels carry. It wraps a
//! [`SourceData`]: the family of reader that produced the change plus the
//! change itself. The entry type and object type tags are derived from the
//! variant, so they always agree with the payload.
//!
//! Entries are values; ownership transfers when an entry is sent on a
//! channel, and only the stage currently holding an entry may touch it.

use std::fmt;

use crate::change::{Change, ChangeType};
use crate::corev1;
use crate::error::ModelError;
use crate::object::{K8sObject, ObjectType};
use crate::uid::Uid;

/// Which [`SourceData`] flavor an entry wraps
///
/// Distinct from [`ObjectType`]: several object kinds share one source
/// family (the informer covers nodes, pods and namespaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Data from the shared informer readers (Node/Pod/Namespace)
    Informer,
    /// Data from the persistent-volume reader
    PersistentVolume,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Informer => "Informer",
            Self::PersistentVolume => "PersistentVolume",
        };
        write!(f, "{s}")
    }
}

/// Borrowed view of the latest state of a changed object
///
/// This is what downstream processors get from [`Entry::object`]: the new
/// object for Add/Update changes and the old one for Delete changes,
/// whatever the concrete kind.
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'a> {
    Node(&'a corev1::Node),
    Pod(&'a corev1::Pod),
    Namespace(&'a corev1::Namespace),
    PersistentVolume(&'a corev1::PersistentVolume),
}

impl ObjectRef<'_> {
    /// The kind of the referenced object
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Node(_) => ObjectType::Node,
            Self::Pod(_) => ObjectType::Pod,
            Self::Namespace(_) => ObjectType::Namespace,
            Self::PersistentVolume(_) => ObjectType::PersistentVolume,
        }
    }

    /// The uid of the referenced object
    pub fn uid(&self) -> Uid {
        match self {
            Self::Node(o) => o.uid(),
            Self::Pod(o) => o.uid(),
            Self::Namespace(o) => o.uid(),
            Self::PersistentVolume(o) => o.uid(),
        }
    }

    /// The name of the referenced object
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Node(o) => o.name(),
            Self::Pod(o) => o.name(),
            Self::Namespace(o) => o.name(),
            Self::PersistentVolume(o) => o.name(),
        }
    }
}

/// The change payload of an informer entry
#[derive(Debug, Clone, PartialEq)]
pub enum InformerChange {
    Node(Change<corev1::Node>),
    Pod(Change<corev1::Pod>),
    Namespace(Change<corev1::Namespace>),
}

impl From<Change<corev1::Node>> for InformerChange {
    fn from(change: Change<corev1::Node>) -> Self {
        Self::Node(change)
    }
}

impl From<Change<corev1::Pod>> for InformerChange {
    fn from(change: Change<corev1::Pod>) -> Self {
        Self::Pod(change)
    }
}

impl From<Change<corev1::Namespace>> for InformerChange {
    fn from(change: Change<corev1::Namespace>) -> Self {
        Self::Namespace(change)
    }
}

/// Data from the shared informer readers
///
/// Wraps a node, pod or namespace change. The uid is captured at
/// construction so batch keying never re-walks the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Informer {
    data: InformerChange,
    uid: Uid,
}

impl Informer {
    /// Create an informer payload from a validated change
    pub fn new(change: impl Into<InformerChange>) -> Result<Self, ModelError> {
        let data = change.into();
        let uid = match &data {
            InformerChange::Node(c) => {
                c.validate()?;
                c.uid()
            }
            InformerChange::Pod(c) => {
                c.validate()?;
                c.uid()
            }
            InformerChange::Namespace(c) => {
                c.validate()?;
                c.uid()
            }
        };
        Ok(Self { data, uid })
    }

    /// Like [`Informer::new`] but panics on an invalid change.
    ///
    /// For tests and program init only.
    pub fn must_new(change: impl Into<InformerChange>) -> Self {
        match Self::new(change) {
            Ok(informer) => informer,
            Err(err) => panic!("invalid informer change: {err}"),
        }
    }

    /// Uid of the changed object
    #[inline]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Kind of the changed object
    pub fn object_type(&self) -> ObjectType {
        match &self.data {
            InformerChange::Node(_) => ObjectType::Node,
            InformerChange::Pod(_) => ObjectType::Pod,
            InformerChange::Namespace(_) => ObjectType::Namespace,
        }
    }

    /// The change as a node change
    pub fn node(&self) -> Result<&Change<corev1::Node>, ModelError> {
        match &self.data {
            InformerChange::Node(c) => Ok(c),
            _ => Err(ModelError::InvalidType("node change")),
        }
    }

    /// The change as a pod change
    pub fn pod(&self) -> Result<&Change<corev1::Pod>, ModelError> {
        match &self.data {
            InformerChange::Pod(c) => Ok(c),
            _ => Err(ModelError::InvalidType("pod change")),
        }
    }

    /// Mutable access to a pod change (pre-processing and redaction)
    pub fn pod_mut(&mut self) -> Result<&mut Change<corev1::Pod>, ModelError> {
        match &mut self.data {
            InformerChange::Pod(c) => Ok(c),
            _ => Err(ModelError::InvalidType("pod change")),
        }
    }

    /// The change as a namespace change
    pub fn namespace(&self) -> Result<&Change<corev1::Namespace>, ModelError> {
        match &self.data {
            InformerChange::Namespace(c) => Ok(c),
            _ => Err(ModelError::InvalidType("namespace change")),
        }
    }

    /// Latest state of the changed object
    pub fn object(&self) -> Option<ObjectRef<'_>> {
        match &self.data {
            InformerChange::Node(c) => c.latest().map(ObjectRef::Node),
            InformerChange::Pod(c) => c.latest().map(ObjectRef::Pod),
            InformerChange::Namespace(c) => c.latest().map(ObjectRef::Namespace),
        }
    }
}

/// Data from the persistent-volume reader
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentVolume {
    data: Change<corev1::PersistentVolume>,
    uid: Uid,
}

impl PersistentVolume {
    /// Create a persistent-volume payload from a validated change
    pub fn new(change: Change<corev1::PersistentVolume>) -> Result<Self, ModelError> {
        change.validate()?;
        let uid = change.uid();
        Ok(Self { data: change, uid })
    }

    /// Like [`PersistentVolume::new`] but panics on an invalid change.
    ///
    /// For tests and program init only.
    pub fn must_new(change: Change<corev1::PersistentVolume>) -> Self {
        match Self::new(change) {
            Ok(pv) => pv,
            Err(err) => panic!("invalid persistent volume change: {err}"),
        }
    }

    /// Uid of the changed object
    #[inline]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Kind of the changed object (always `PersistentVolume`)
    #[inline]
    pub fn object_type(&self) -> ObjectType {
        ObjectType::PersistentVolume
    }

    /// The wrapped change
    #[inline]
    pub fn change(&self) -> &Change<corev1::PersistentVolume> {
        &self.data
    }

    /// Mutable access to the wrapped change (pre-processing)
    #[inline]
    pub fn change_mut(&mut self) -> &mut Change<corev1::PersistentVolume> {
        &mut self.data
    }

    /// Latest state of the changed object
    pub fn object(&self) -> Option<ObjectRef<'_>> {
        self.data.latest().map(ObjectRef::PersistentVolume)
    }
}

/// The payload families an entry can carry
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    Informer(Informer),
    PersistentVolume(PersistentVolume),
}

impl SourceData {
    /// Uid of the changed object
    pub fn uid(&self) -> &Uid {
        match self {
            Self::Informer(i) => i.uid(),
            Self::PersistentVolume(pv) => pv.uid(),
        }
    }

    /// The entry-type tag matching this payload
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Informer(_) => EntryType::Informer,
            Self::PersistentVolume(_) => EntryType::PersistentVolume,
        }
    }

    /// Latest state of the changed object
    pub fn object(&self) -> Option<ObjectRef<'_>> {
        match self {
            Self::Informer(i) => i.object(),
            Self::PersistentVolume(pv) => pv.object(),
        }
    }
}

impl From<Informer> for SourceData {
    fn from(informer: Informer) -> Self {
        Self::Informer(informer)
    }
}

impl From<PersistentVolume> for SourceData {
    fn from(pv: PersistentVolume) -> Self {
        Self::PersistentVolume(pv)
    }
}

/// The uniform envelope carried by every pipeline channel
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    data: SourceData,
}

impl Entry {
    /// Wrap a payload in an entry
    ///
    /// Infallible: the entry-type tag is derived from the payload variant,
    /// and the payload constructors already validated the change shape.
    pub fn new(data: impl Into<SourceData>) -> Self {
        Self { data: data.into() }
    }

    /// Uid of the changed object; always the latest change
    #[inline]
    pub fn uid(&self) -> &Uid {
        self.data.uid()
    }

    /// Which payload family this entry wraps
    #[inline]
    pub fn entry_type(&self) -> EntryType {
        self.data.entry_type()
    }

    /// Latest state of the changed object
    pub fn object(&self) -> Option<ObjectRef<'_>> {
        self.data.object()
    }

    /// The payload as informer data
    pub fn informer(&self) -> Result<&Informer, ModelError> {
        match &self.data {
            SourceData::Informer(i) => Ok(i),
            _ => Err(ModelError::InvalidType("informer entry")),
        }
    }

    /// Mutable access to informer data (pre-processing and redaction)
    pub fn informer_mut(&mut self) -> Result<&mut Informer, ModelError> {
        match &mut self.data {
            SourceData::Informer(i) => Ok(i),
            _ => Err(ModelError::InvalidType("informer entry")),
        }
    }

    /// The payload as persistent-volume data
    pub fn persistent_volume(&self) -> Result<&PersistentVolume, ModelError> {
        match &self.data {
            SourceData::PersistentVolume(pv) => Ok(pv),
            _ => Err(ModelError::InvalidType("persistent volume entry")),
        }
    }

    /// Mutable access to persistent-volume data (pre-processing)
    pub fn persistent_volume_mut(&mut self) -> Result<&mut PersistentVolume, ModelError> {
        match &mut self.data {
            SourceData::PersistentVolume(pv) => Ok(pv),
            _ => Err(ModelError::InvalidType("persistent volume entry")),
        }
    }

    /// The kind of change this entry describes
    pub fn change_type(&self) -> ChangeType {
        match &self.data {
            SourceData::Informer(i) => match &i.data {
                InformerChange::Node(c) => c.change_type,
                InformerChange::Pod(c) => c.change_type,
                InformerChange::Namespace(c) => c.change_type,
            },
            SourceData::PersistentVolume(pv) => pv.data.change_type,
        }
    }
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;
