//! Reader error types

use thiserror::Error;

/// Errors produced by reader registration and startup
#[derive(Debug, Error)]
pub enum ReaderError {
    /// `set_out` was called after the reader started
    #[error("cannot set the output channel once the reader has started")]
    SetOutAfterRun,

    /// `run` was called more than once
    #[error("reader already started")]
    AlreadyStarted,

    /// `run` was called before `set_out`
    #[error("no output channel set")]
    NoOutput,

    /// No watch kinds were selected
    #[error("no watch kinds selected")]
    NoKinds,

    /// The Kubernetes client failed
    #[error(transparent)]
    Kube(#[from] kube::Error),
}
