//! Data-store interface consumed by the orchestrator.

use thiserror::Error;

use crate::filter::Predicate;
use crate::sort::SortSpec;

/// The store could not be reached (timeout, connection refused, ...).
///
/// Deliberately opaque: callers retry or surface it, they never branch on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only query primitives over one entity type.
///
/// `count` and `fetch_page` must reflect a consistent snapshot relative to
/// each other within one request; nothing is required across requests.
/// Implementations must order rows exactly per the sort spec (including the
/// id tie-break) so page boundaries are deterministic.
pub trait EntityStore<T>: Send + Sync {
    /// Number of rows matching the predicates, before pagination.
    fn count(
        &self,
        predicates: &[Predicate],
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// One ordered page of matching rows.
    fn fetch_page(
        &self,
        predicates: &[Predicate],
        sort: &SortSpec,
        offset: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<T>, StoreError>> + Send;
}
