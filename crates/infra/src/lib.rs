//! `storefront-infra` — data-store implementations.
//!
//! The in-memory store backs development and tests; the Postgres store (the
//! `postgres` feature) backs deployments. Both implement the query core's
//! [`storefront_query::EntityStore`] for each entity plus the CRUD surface,
//! and both enforce the referential policies: category names are unique,
//! products must reference an existing category, orders an existing product,
//! and deleting a record with dependants is a conflict.

pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use error::{RepoError, RepoResult};
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
