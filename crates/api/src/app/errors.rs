//! Error → HTTP response mapping.
//!
//! Callers always receive a structured error object naming the error kind
//! and the offending parameter; store internals are never exposed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::RepoError;
use storefront_query::QueryError;

pub fn query_error_to_response(err: QueryError) -> axum::response::Response {
    match &err {
        QueryError::InvalidFilterValue { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_filter_value", err.to_string())
        }
        QueryError::InvalidRange { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_range", err.to_string())
        }
        QueryError::InvalidSortField(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_sort_field", err.to_string())
        }
        QueryError::InvalidPage(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_page", err.to_string())
        }
        QueryError::EntityNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        QueryError::StoreUnavailable(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_unavailable",
            "store unavailable",
        ),
    }
}

pub fn repo_error_to_response(err: RepoError) -> axum::response::Response {
    match &err {
        RepoError::Domain(DomainError::Validation { .. }) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
        RepoError::Domain(DomainError::InvalidId(_)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
        }
        RepoError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        RepoError::Domain(DomainError::Conflict(_)) => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        RepoError::Unavailable(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_unavailable",
            "store unavailable",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
