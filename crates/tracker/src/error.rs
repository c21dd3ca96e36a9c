//! Orchestration error types.

use domain::error::DomainError;
use persistence::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the ingest and replay pipelines.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A replay was cancelled mid-stream; nothing was persisted.
    #[error("operation cancelled before completion")]
    Cancelled,
}
