//! Domain error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by the core tracking services.
///
/// Every failure is a precondition violation the caller can act on; no
/// recoverable error path is swallowed.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input (non-finite coordinates, negative speed, empty
    /// point stream, bad license plate, invalid geofence zone).
    #[error("invalid input: {0}")]
    Validation(String),

    /// A vehicle's point stream was not ordered by timestamp.
    #[error("out-of-order point stream: {current} follows {previous}")]
    Sequence {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    /// A storage collaborator failed mid-operation.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let joined = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{field}: {message}")
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        DomainError::Validation(joined)
    }
}
