//! Model error types

use thiserror::Error;

/// Errors produced by envelope constructors and accessors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// An accessor was called for a variant the value does not hold
    #[error("invalid type: value is not a {0}")]
    InvalidType(&'static str),

    /// A change violated the Add/Update/Delete shape invariants
    #[error("change invariant violated: {0}")]
    InvariantViolation(&'static str),
}
