//! Errors surfaced by query resolution.

use thiserror::Error;

/// A list request failed to resolve or execute.
///
/// Validation variants are detected entirely before any store access and
/// always name the offending parameter. `StoreUnavailable` is only surfaced
/// after the orchestrator's single internal retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A filter value could not be coerced to the field's declared type.
    #[error("invalid value for filter `{field}`: {message}")]
    InvalidFilterValue { field: String, message: String },

    /// A range filter was given with min > max.
    #[error("invalid range for `{field}`: min must not exceed max")]
    InvalidRange { field: String },

    /// The requested sort key is not in the entity's allow-list.
    #[error("invalid sort field `{0}`")]
    InvalidSortField(String),

    /// The page or page_size parameter was not a number.
    #[error("invalid page parameter: {0}")]
    InvalidPage(String),

    /// The requested record does not exist.
    #[error("not found")]
    EntityNotFound,

    /// The data store stayed unreachable after one retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl QueryError {
    pub fn invalid_filter_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_range(field: impl Into<String>) -> Self {
        Self::InvalidRange {
            field: field.into(),
        }
    }
}
