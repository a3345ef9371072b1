//! Store-layer error model.

use thiserror::Error;

use storefront_core::DomainError;

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome of a CRUD operation against a store.
///
/// Domain failures (validation, not-found, conflicts) pass through
/// unchanged; everything infrastructural collapses into `Unavailable`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn not_found() -> Self {
        Self::Domain(DomainError::NotFound)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Domain(DomainError::conflict(msg))
    }
}
