//! Domain error types.

use thiserror::Error;

/// Errors raised by aggregate factories and guarded mutators.
///
/// The two variants correspond to the two ways a domain operation can be
/// rejected: the supplied value is invalid, or the aggregate is not in a
/// state that permits the operation. Both carry a human-readable reason
/// that the orchestration layer passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A field value is structurally present but semantically invalid.
    #[error("{0}")]
    Validation(String),

    /// A guarded mutation was attempted from a state that disallows it.
    #[error("{0}")]
    StateConflict(String),
}

impl DomainError {
    /// Builds a validation failure with the given reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Builds a state-conflict failure with the given reason.
    pub fn state_conflict(reason: impl Into<String>) -> Self {
        Self::StateConflict(reason.into())
    }
}
