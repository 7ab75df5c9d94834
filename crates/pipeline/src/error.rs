//! Pipeline error types
//!
//! Structural errors (bad registration, double start) are returned to the
//! caller; per-entry errors are logged by the owning stage and the entry is
//! dropped, so they never surface here.

use thiserror::Error;

/// Boxed error type used at the reader and pre-processor boundaries, where
/// implementations supply their own error types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Registration attempted after the pipeline started
    #[error("cannot register after start")]
    RegisterAfterStart,

    /// A route was registered with an empty name
    #[error("route name cannot be empty")]
    EmptyRouteName,

    /// A route with the same name is already registered
    #[error("route already registered: {0}")]
    DuplicateRoute(String),

    /// Start was called with no registered routes
    #[error("cannot start without registered routes")]
    NoRoutes,

    /// Start was called more than once
    #[error("already started")]
    AlreadyStarted,

    /// The batch window must be a positive duration
    #[error("batch window must be non-zero")]
    ZeroWindow,

    /// A reader failed during registration or startup
    #[error("reader: {0}")]
    Reader(BoxError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
