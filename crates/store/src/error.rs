use thiserror::Error;

/// Errors surfaced by repository ports.
///
/// The in-memory implementations never fail; adapters for real storage
/// map their backend's errors into `Backend`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
