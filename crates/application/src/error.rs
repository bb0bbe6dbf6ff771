//! Orchestration error taxonomy.

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Failures surfaced by orchestration operations.
///
/// Callers map these to transport-specific codes (a REST layer would use
/// 400 for `Validation`, 404 for `NotFound`, 409 for `StateConflict`).
/// Nothing here is retried internally. A null-command precondition failure
/// has no variant: commands are owned values and required fields are
/// non-optional types, so that class of error cannot be constructed.
#[derive(Debug, Error)]
pub enum AppError {
    /// A field is structurally present but semantically invalid.
    #[error("{0}")]
    Validation(String),

    /// A referenced aggregate id did not resolve through its repository.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A guarded mutation was attempted from a state that disallows it.
    #[error("{0}")]
    StateConflict(String),

    /// The storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Builds a validation failure with the given reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Builds a not-found failure for the given entity and id.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(reason) => AppError::Validation(reason),
            DomainError::StateConflict(reason) => AppError::StateConflict(reason),
        }
    }
}
