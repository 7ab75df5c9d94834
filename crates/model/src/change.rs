//! Change record
//!
//! A `Change<T>` is one observed transition of a single object: the kind of
//! transition plus the object state before and after it. Which of `old` and
//! `new` must be populated depends on the change type:
//!
//! | change type | old  | new  |
//! |-------------|------|------|
//! | Add         | none | set  |
//! | Update      | set  | set  |
//! | Delete      | set  | none |
//!
//! Readers assemble changes field-wise from watch callbacks; the envelope
//! constructors ([`crate::Informer::new`], [`crate::PersistentVolume::new`])
//! re-validate the shape before a change enters the pipeline.

use std::sync::Arc;

use crate::error::ModelError;
use crate::object::K8sObject;
use crate::uid::Uid;

/// The kind of transition a change describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// The object was created (or first seen)
    Add,
    /// The object was modified
    Update,
    /// The object was removed
    Delete,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Add => "Add",
            Self::Update => "Update",
            Self::Delete => "Delete",
        };
        write!(f, "{s}")
    }
}

/// A single observed transition of one object
///
/// Payloads are `Arc`-wrapped so cloning a change (and the entry that wraps
/// it) never copies a Kubernetes object. The redaction stage mutates the
/// payload through [`Change::latest_mut`], which is copy-free while the
/// entry is uniquely owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Change<T: K8sObject> {
    /// State before the transition. Set for Update and Delete.
    pub old: Option<Arc<T>>,
    /// State after the transition. Set for Add and Update.
    pub new: Option<Arc<T>>,
    /// The kind of transition.
    pub change_type: ChangeType,
}

impl<T: K8sObject> Change<T> {
    /// Create a validated change
    ///
    /// Returns [`ModelError::InvariantViolation`] when the populated fields
    /// do not match the change type.
    pub fn new(
        new: Option<Arc<T>>,
        old: Option<Arc<T>>,
        change_type: ChangeType,
    ) -> Result<Self, ModelError> {
        let change = Self {
            old,
            new,
            change_type,
        };
        change.validate()?;
        Ok(change)
    }

    /// Create an Add change carrying the new object
    pub fn add(new: impl Into<Arc<T>>) -> Self {
        Self {
            old: None,
            new: Some(new.into()),
            change_type: ChangeType::Add,
        }
    }

    /// Create an Update change carrying both states
    pub fn update(new: impl Into<Arc<T>>, old: impl Into<Arc<T>>) -> Self {
        Self {
            old: Some(old.into()),
            new: Some(new.into()),
            change_type: ChangeType::Update,
        }
    }

    /// Create a Delete change carrying the last known state
    pub fn delete(old: impl Into<Arc<T>>) -> Self {
        Self {
            old: Some(old.into()),
            new: None,
            change_type: ChangeType::Delete,
        }
    }

    /// The kind of object this change concerns
    #[inline]
    pub fn object_type(&self) -> crate::ObjectType {
        T::OBJECT_TYPE
    }

    /// Check the shape invariants
    pub fn validate(&self) -> Result<(), ModelError> {
        match self.change_type {
            ChangeType::Add => {
                if self.new.is_none() {
                    return Err(ModelError::InvariantViolation(
                        "add must carry a new object",
                    ));
                }
                if self.old.is_some() {
                    return Err(ModelError::InvariantViolation(
                        "add must not carry an old object",
                    ));
                }
            }
            ChangeType::Update => {
                if self.new.is_none() || self.old.is_none() {
                    return Err(ModelError::InvariantViolation(
                        "update must carry both old and new objects",
                    ));
                }
            }
            ChangeType::Delete => {
                if self.old.is_none() {
                    return Err(ModelError::InvariantViolation(
                        "delete must carry an old object",
                    ));
                }
                if self.new.is_some() {
                    return Err(ModelError::InvariantViolation(
                        "delete must not carry a new object",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Uid of the object being changed
    ///
    /// Delete changes report the uid of the old object, everything else the
    /// uid of the new one. Empty when the relevant payload is missing or
    /// carried no `metadata.uid`.
    pub fn uid(&self) -> Uid {
        self.latest().map(K8sObject::uid).unwrap_or_default()
    }

    /// The latest state of the object: `new` for Add/Update, `old` for
    /// Delete
    pub fn latest(&self) -> Option<&T> {
        match self.change_type {
            ChangeType::Delete => self.old.as_deref(),
            ChangeType::Add | ChangeType::Update => self.new.as_deref(),
        }
    }

    /// Mutable access to the latest state
    ///
    /// Clones the payload first if it is shared (`Arc::make_mut`); inside
    /// the pipeline entries are uniquely owned, so no copy happens there.
    pub fn latest_mut(&mut self) -> Option<&mut T> {
        match self.change_type {
            ChangeType::Delete => self.old.as_mut().map(Arc::make_mut),
            ChangeType::Add | ChangeType::Update => self.new.as_mut().map(Arc::make_mut),
        }
    }
}

#[cfg(test)]
#[path = "change_test.rs"]
mod tests;
