//! Error types for the pagination engine and its backend collaborator.

use thiserror::Error;

/// Failure reported by the backend collection engine.
///
/// The engine never interprets these beyond mapping them into
/// [`PaginationError`] or passing them through in a cursor result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Collection not found")]
    NotFound,

    #[error("Collection already released")]
    Released,

    #[error("Backend error: {0}")]
    Other(String),
}

/// Failure of a list scroller operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// The scroller was disconnected before this call.
    #[error("Paginator already terminated")]
    PaginatorAlreadyTerminated,

    /// Filters changed while the fetch was in flight; its result no longer
    /// matches what the caller asked for. The window already grew, so the
    /// caller reloads instead of repeating the fetch.
    #[error("Filters changed during fetch")]
    StaleFilters,

    #[error("Backend timed out")]
    BackendTimeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Collection not found")]
    CollectionNotFound,

    #[error("Collection already released")]
    CollectionReleased,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl PaginationError {
    /// Whether retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PaginationError::BackendTimeout | PaginationError::Network(_)
        )
    }
}

impl From<BackendError> for PaginationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout => PaginationError::BackendTimeout,
            BackendError::Network(msg) => PaginationError::Network(msg),
            BackendError::NotFound => PaginationError::CollectionNotFound,
            BackendError::Released => PaginationError::CollectionReleased,
            BackendError::Other(msg) => PaginationError::Backend(msg),
        }
    }
}
