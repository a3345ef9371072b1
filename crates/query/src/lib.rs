//! `storefront-query` — the query-resolution core.
//!
//! Turns a raw list request (filter parameters, sort key, page parameters)
//! into a deterministic, bounded, validated result set against a narrow
//! data-store interface. Everything in this crate except the two store calls
//! in [`orchestrator::run_list`] is a pure function of its inputs.

pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod page;
pub mod schema;
pub mod sort;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::QueryError;
pub use filter::{Predicate, PredicateOp};
pub use orchestrator::{ListParams, run_list};
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageEnvelope, PageRequest, PageWindow};
pub use schema::{Direction, EntitySchema, FieldKind, FieldSchema, FieldValue, FilterOp, Queryable};
pub use sort::{SortKey, SortSpec};
pub use store::{EntityStore, StoreError};
